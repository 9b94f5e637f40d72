use anyhow::Context;
use clap::error::{ContextKind, ContextValue};
use clap::{ArgMatches, Command};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::exit;
use std::{fs, io};
use tagwire::Typespace;

use crate::errors::CliError;

pub fn match_subcommand_or_exit(command: Command) -> (String, ArgMatches) {
    let mut command_clone = command.clone();
    let args = match command.try_get_matches() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            clap::error::ErrorKind::MissingSubcommand
            | clap::error::ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                let subcmd = e.context().find_map(|c| match c {
                    (ContextKind::InvalidSubcommand, ContextValue::String(cmd)) => cmd.split_ascii_whitespace().last(),
                    _ => None,
                });
                let _ = match subcmd.and_then(|cmd| command_clone.find_subcommand_mut(cmd)) {
                    Some(subcmd) => subcmd.print_help(),
                    None => command_clone.print_help(),
                };
                exit(0);
            }
            _ => e.exit(),
        },
    };
    match args.subcommand() {
        Some((cmd, subcommand_args)) => (cmd.to_string(), subcommand_args.clone()),
        None => {
            let _ = command_clone.print_help();
            exit(2);
        }
    }
}

/// Returns the path given for `name`, which clap guarantees for required arguments.
pub fn path_arg<'a>(args: &'a ArgMatches, name: &str) -> anyhow::Result<&'a Path> {
    args.get_one::<PathBuf>(name)
        .map(PathBuf::as_path)
        .with_context(|| format!("missing argument `{name}`"))
}

pub fn str_arg<'a>(args: &'a ArgMatches, name: &str) -> anyhow::Result<&'a str> {
    args.get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("missing argument `{name}`"))
}

/// Reads the whole of `path`, or of stdin when `path` is absent or `-`.
pub fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) if path != Path::new("-") => {
            fs::read_to_string(path).with_context(|| format!("failed to read `{}`", path.display()))
        }
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Checks that `name` is a declared union, listing the declared ones otherwise.
pub fn require_union(ts: &Typespace, name: &str) -> Result<(), CliError> {
    if ts.lookup(name).and_then(|r| ts.union_type(r)).is_some() {
        return Ok(());
    }
    let declared = ts
        .iter()
        .filter_map(|(_, def)| def.as_union())
        .map(|union| format!("`{}`", union.name))
        .collect::<Vec<_>>();
    Err(CliError::UnknownUnion {
        name: name.to_string(),
        declared: if declared.is_empty() {
            "none".to_string()
        } else {
            declared.join(", ")
        },
    })
}
