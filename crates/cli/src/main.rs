use clap::Command;
use env_logger::Env;
use tagwire_cli::*;

fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let (cmd, subcommand_args) = util::match_subcommand_or_exit(get_command());
    exec_subcommand(&cmd, &subcommand_args)?;

    Ok(())
}

fn get_command() -> Command {
    Command::new("tagwire")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect tagged unions declared in a TOML or JSON file")
        .args_conflicts_with_subcommands(true)
        .subcommand_required(true)
        .subcommands(get_subcommands())
        .help_expected(true)
}
