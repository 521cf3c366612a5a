use crate::commands::{format_arg, format_option, required_value};
use crate::{codec, Format, Transaction, TxHandler, UtxoPool};
use clap::{Arg, ArgMatches, Command};
use std::error::Error;
use std::path::PathBuf;

struct ValidateCliOptions {
    pool: PathBuf,
    transaction: PathBuf,
    format: Option<Format>,
}

impl ValidateCliOptions {
    pub fn parse(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            pool: PathBuf::from(required_value(matches, "pool")?),
            transaction: PathBuf::from(required_value(matches, "transaction")?),
            format: format_option(matches)?,
        })
    }
}

pub fn validate_command() -> Command<'static> {
    Command::new("validate")
        .version("0.1")
        .about("Checks whether a transaction is valid against a pool snapshot.")
        .arg(
            Arg::new("pool")
                .long("pool")
                .value_name("FILE")
                .help("The pool of unspent transaction outputs.")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("transaction")
                .long("transaction")
                .value_name("FILE")
                .help("The transaction to validate.")
                .takes_value(true)
                .required(true),
        )
        .arg(format_arg())
}

pub fn run_validate_command(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let options = ValidateCliOptions::parse(matches)?;
    let pool: UtxoPool = codec::load(&options.pool, options.format)?;
    let transaction: Transaction = codec::load(&options.transaction, options.format)?;
    let handler = TxHandler::new(&pool);
    match handler.validate(&transaction) {
        Ok(fee) => println!("{}: valid (fee: {})", transaction.id(), fee),
        Err(e) => println!("{}: invalid: {}", transaction.id(), e),
    }
    Ok(())
}
