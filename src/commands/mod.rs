pub mod epoch_command;
pub mod keygen_command;
pub mod sign_command;
pub mod validate_command;

pub use self::{epoch_command::*, keygen_command::*, sign_command::*, validate_command::*};

use crate::Format;
use clap::{Arg, ArgMatches};

fn format_arg() -> Arg<'static> {
    Arg::new("format")
        .long("format")
        .value_name("json|bincode")
        .help("Format of the files. Inferred from the extension by default.")
        .takes_value(true)
        .required(false)
}

fn required_value<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str, String> {
    matches
        .value_of(name)
        .ok_or_else(|| format!("Missing required argument: --{}", name))
}

fn format_option(matches: &ArgMatches) -> Result<Option<Format>, String> {
    matches.value_of("format").map(str::parse).transpose()
}
