use crate::KeyPair;
use clap::{ArgMatches, Command};
use std::error::Error;

pub fn keygen_command() -> Command<'static> {
    Command::new("keygen")
        .version("0.1")
        .about("Generates a new key pair and prints its secret key and address.")
}

pub fn run_keygen_command(_matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let key_pair = KeyPair::generate();
    println!("secret:  {}", key_pair.secret_hex());
    println!("address: {}", key_pair.address());
    Ok(())
}
