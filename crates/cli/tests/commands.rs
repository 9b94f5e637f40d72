use clap::Command;
use std::path::PathBuf;
use tagwire_cli::get_subcommands;

fn command() -> Command {
    Command::new("tagwire")
        .subcommand_required(true)
        .subcommands(get_subcommands())
        .help_expected(true)
}

#[test]
fn command_is_well_formed() {
    command().debug_assert();
}

#[test]
fn decode_arguments() {
    let matches = command()
        .try_get_matches_from([
            "tagwire",
            "decode",
            "Feed",
            "feed.json",
            "--schema",
            "decl.toml",
            "--canonical",
            "--empty-as-object",
        ])
        .unwrap();
    let (cmd, args) = matches.subcommand().unwrap();
    assert_eq!(cmd, "decode");
    assert_eq!(args.get_one::<String>("union").unwrap(), "Feed");
    assert_eq!(args.get_one::<PathBuf>("input").unwrap(), &PathBuf::from("feed.json"));
    assert_eq!(args.get_one::<PathBuf>("schema").unwrap(), &PathBuf::from("decl.toml"));
    assert!(args.get_flag("empty_as_object"));
}

#[test]
fn empty_as_object_needs_canonical() {
    let err = command()
        .try_get_matches_from(["tagwire", "decode", "Feed", "--schema", "decl.toml", "--empty-as-object"])
        .unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
}
