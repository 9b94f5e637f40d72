mod common_args;
pub mod config;
mod errors;
mod subcommands;
pub mod util;

use clap::{ArgMatches, Command};

pub use config::{load_typespace, DeclarationFile};
pub use errors::CliError;
pub use subcommands::*;

pub fn get_subcommands() -> Vec<Command> {
    vec![describe::cli(), decode::cli(), schema::cli()]
}

pub fn exec_subcommand(cmd: &str, args: &ArgMatches) -> Result<(), anyhow::Error> {
    match cmd {
        "describe" => describe::exec(args),
        "decode" => decode::exec(args),
        "schema" => schema::exec(args),
        unknown => Err(anyhow::anyhow!("Invalid subcommand: {}", unknown)),
    }
}
