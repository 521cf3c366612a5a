use crate::commands::{format_arg, format_option, required_value};
use crate::{codec, Format, KeyPair, Transaction, TransactionBuilder};
use clap::{Arg, ArgMatches, Command};
use std::error::Error;
use std::path::PathBuf;

struct SignCliOptions {
    transaction: PathBuf,
    key: KeyPair,
    input: usize,
    out: PathBuf,
    format: Option<Format>,
}

impl SignCliOptions {
    pub fn parse(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        let transaction = PathBuf::from(required_value(matches, "transaction")?);
        let out = matches
            .value_of("out")
            .map(PathBuf::from)
            .unwrap_or_else(|| transaction.clone());
        Ok(Self {
            transaction,
            key: KeyPair::from_hex(required_value(matches, "key")?)?,
            input: matches.value_of_t::<usize>("input")?,
            out,
            format: format_option(matches)?,
        })
    }
}

pub fn sign_command() -> Command<'static> {
    Command::new("sign")
        .version("0.1")
        .about("Signs one input of a transaction with the owner's secret key.")
        .arg(
            Arg::new("transaction")
                .long("transaction")
                .value_name("FILE")
                .help("The transaction to sign.")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("key")
                .long("key")
                .value_name("SECRET_KEY")
                .help("Hex-encoded secret key of the owner of the spent output.")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("input")
                .long("input")
                .value_name("INDEX")
                .help("Index of the input to sign.")
                .takes_value(true)
                .required(false)
                .default_value("0"),
        )
        .arg(
            Arg::new("out")
                .long("out")
                .value_name("FILE")
                .help("Where to write the signed transaction. Defaults to the input file.")
                .takes_value(true)
                .required(false),
        )
        .arg(format_arg())
}

pub fn run_sign_command(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let options = SignCliOptions::parse(matches)?;
    let transaction: Transaction = codec::load(&options.transaction, options.format)?;
    let mut builder = TransactionBuilder::from(transaction);
    builder.sign_input(options.input, &options.key)?;
    let signed = builder.build();
    codec::save(&options.out, options.format, &signed)?;
    println!("{}", signed.id());
    Ok(())
}
