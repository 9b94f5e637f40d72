use crate::common_args;
use crate::config::load_typespace;
use crate::util::{path_arg, require_union, str_arg};
use anyhow::Context;
use clap::ArgMatches;

pub fn cli() -> clap::Command {
    clap::Command::new("schema")
        .about("Prints the JSON Schema of a declared union")
        .arg(common_args::union())
        .arg(common_args::schema())
}

pub fn exec(args: &ArgMatches) -> Result<(), anyhow::Error> {
    let ts = load_typespace(path_arg(args, "schema")?)?;
    let union = str_arg(args, "union")?;
    require_union(&ts, union)?;
    let schema = ts
        .json_schema(union)
        .with_context(|| format!("failed to generate the schema of `{union}`"))?;
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
