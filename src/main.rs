use clap::{Arg, Command};
use std::error::Error;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    let matches = Command::new("settlecoin")
        .about("SettleCoin transaction settlement tools.")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("enable_logging")
                .long("enable_logging")
                .help("Logs validation and epoch progress to stderr, filtered by RUST_LOG.")
                .takes_value(false)
                .global(true),
        )
        .subcommand(settlecoin_lib::commands::keygen_command())
        .subcommand(settlecoin_lib::commands::sign_command())
        .subcommand(settlecoin_lib::commands::validate_command())
        .subcommand(settlecoin_lib::commands::epoch_command())
        .get_matches();

    if matches.is_present("enable_logging") {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    match matches.subcommand() {
        Some(("keygen", matches)) => settlecoin_lib::commands::run_keygen_command(matches),
        Some(("sign", matches)) => settlecoin_lib::commands::run_sign_command(matches),
        Some(("validate", matches)) => settlecoin_lib::commands::run_validate_command(matches),
        Some(("epoch", matches)) => settlecoin_lib::commands::run_epoch_command(matches),
        _ => Err("Unknown subcommand, see --help.".into()),
    }
}
