use clap::Arg;
use clap::ArgAction::SetTrue;
use std::path::PathBuf;

pub fn schema() -> Arg {
    Arg::new("schema")
        .long("schema")
        .short('s')
        .env("TAGWIRE_SCHEMA")
        .required(true)
        .value_parser(clap::value_parser!(PathBuf))
        .help("The declaration file, in TOML or JSON")
}

pub fn union() -> Arg {
    Arg::new("union")
        .required(true)
        .help("The name of a declared union")
}

pub fn empty_as_object() -> Arg {
    Arg::new("empty_as_object")
        .long("empty-as-object")
        .action(SetTrue)
        .help("Encode variants without payload of externally tagged unions as `{\"Name\": null}`")
}
