use crate::commands::{format_arg, format_option, required_value};
use crate::{codec, Format, HandlerParams, Transaction, TxHandler, UtxoPool};
use clap::{Arg, ArgMatches, Command};
use std::error::Error;
use std::path::PathBuf;

struct EpochCliOptions {
    pool: PathBuf,
    batch: PathBuf,
    out: Option<PathBuf>,
    format: Option<Format>,
    params: HandlerParams,
}

impl EpochCliOptions {
    pub fn parse(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            pool: PathBuf::from(required_value(matches, "pool")?),
            batch: PathBuf::from(required_value(matches, "batch")?),
            out: matches.value_of("out").map(PathBuf::from),
            format: format_option(matches)?,
            params: HandlerParams {
                tie_break: matches.value_of_t("tie_break")?,
            },
        })
    }
}

pub fn epoch_command() -> Command<'static> {
    Command::new("epoch")
        .version("0.1")
        .about("Commits a batch of transactions on top of a pool snapshot.")
        .arg(
            Arg::new("pool")
                .long("pool")
                .value_name("FILE")
                .help("The pool of unspent transaction outputs.")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("batch")
                .long("batch")
                .value_name("FILE")
                .help("The list of candidate transactions.")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("out")
                .long("out")
                .value_name("FILE")
                .help("Where to write the updated pool.")
                .takes_value(true)
                .required(false),
        )
        .arg(
            Arg::new("tie_break")
                .long("tie-break")
                .value_name("presentation|id")
                .help("Order in which candidates are tried within a pass.")
                .takes_value(true)
                .required(false)
                .default_value("presentation"),
        )
        .arg(format_arg())
}

pub fn run_epoch_command(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let options = EpochCliOptions::parse(matches)?;
    let pool: UtxoPool = codec::load(&options.pool, options.format)?;
    let batch: Vec<Transaction> = codec::load(&options.batch, options.format)?;

    let mut handler = TxHandler::new(&pool).with_params(options.params);
    let report = handler.process_epoch_with_report(&batch);

    println!("Accepted");
    for transaction in &report.accepted {
        println!("  {}", transaction.id());
    }
    println!("Dropped");
    for (transaction, reason) in &report.dropped {
        println!("  {}: {}", transaction.id(), reason);
    }
    println!("{}", report);

    let pool = handler.into_pool();
    match pool.total_value() {
        Some(total) => println!("Pool: {} outputs worth {}", pool.len(), total),
        None => println!("Pool: {} outputs, total value overflows", pool.len()),
    }
    if let Some(out) = &options.out {
        codec::save(out, options.format, &pool)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Coin, KeyPair, OutputIndex, Sha256, TieBreak, TransactionBuilder, TransactionId,
        TransactionOutput, Utxo,
    };
    use std::path::Path;

    fn path_arg(path: &Path) -> &str {
        path.to_str().unwrap()
    }

    #[test]
    fn parses_paths_and_tie_break() {
        let matches = epoch_command()
            .try_get_matches_from(vec![
                "epoch",
                "--pool",
                "pool.json",
                "--batch",
                "batch.dat",
                "--tie-break",
                "id",
                "--format",
                "bincode",
            ])
            .unwrap();
        let options = EpochCliOptions::parse(&matches).unwrap();

        assert_eq!(options.pool, PathBuf::from("pool.json"));
        assert_eq!(options.batch, PathBuf::from("batch.dat"));
        assert_eq!(options.out, None);
        assert_eq!(options.format, Some(Format::Bincode));
        assert_eq!(options.params.tie_break, TieBreak::TransactionId);
    }

    #[test]
    fn tie_break_defaults_to_presentation() {
        let matches = epoch_command()
            .try_get_matches_from(vec!["epoch", "--pool", "p.json", "--batch", "b.json"])
            .unwrap();
        let options = EpochCliOptions::parse(&matches).unwrap();

        assert_eq!(options.params.tie_break, TieBreak::Presentation);
        assert_eq!(options.format, None);
    }

    #[test]
    fn unknown_tie_break_or_format_is_an_error() {
        let matches = epoch_command()
            .try_get_matches_from(vec![
                "epoch",
                "--pool",
                "p.json",
                "--batch",
                "b.json",
                "--tie-break",
                "random",
            ])
            .unwrap();
        assert!(EpochCliOptions::parse(&matches).is_err());

        let matches = epoch_command()
            .try_get_matches_from(vec![
                "epoch", "--pool", "p.json", "--batch", "b.json", "--format", "xml",
            ])
            .unwrap();
        assert!(EpochCliOptions::parse(&matches).is_err());
    }

    #[test]
    fn missing_batch_is_rejected() {
        assert!(epoch_command()
            .try_get_matches_from(vec!["epoch", "--pool", "p.json"])
            .is_err());
    }

    #[test]
    fn writes_updated_pool_to_out() {
        let alice = KeyPair::from_seed([1; 32]);
        let bob = KeyPair::from_seed([2; 32]).address();
        let funding = Utxo::new(
            TransactionId::new(Sha256::digest(b"funding")),
            OutputIndex::new(0),
        );
        let mut pool = UtxoPool::new();
        pool.add_utxo(
            funding,
            TransactionOutput::new(Coin::new(10), alice.address()),
        );
        let mut builder = TransactionBuilder::new();
        builder
            .add_input(*funding.transaction_id(), funding.output_index())
            .add_output(Coin::new(7), bob);
        builder.sign_input(0, &alice).unwrap();
        let transaction = builder.build();

        let dir = tempfile::tempdir().unwrap();
        let pool_path = dir.path().join("pool.json");
        let batch_path = dir.path().join("batch.json");
        let out_path = dir.path().join("out.dat");
        codec::save(&pool_path, None, &pool).unwrap();
        codec::save(&batch_path, None, &vec![transaction.clone()]).unwrap();

        let matches = epoch_command()
            .try_get_matches_from(vec![
                "epoch",
                "--pool",
                path_arg(&pool_path),
                "--batch",
                path_arg(&batch_path),
                "--out",
                path_arg(&out_path),
            ])
            .unwrap();
        run_epoch_command(&matches).unwrap();

        let updated: UtxoPool = codec::load(&out_path, None).unwrap();
        assert!(!updated.contains(&funding));
        assert_eq!(
            updated.utxos(),
            vec![Utxo::new(*transaction.id(), OutputIndex::new(0))]
        );
        assert_eq!(updated.total_value(), Some(Coin::new(7)));
        assert_eq!(codec::load::<UtxoPool>(&pool_path, None).unwrap(), pool);
    }
}
