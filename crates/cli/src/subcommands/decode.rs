use crate::common_args;
use crate::config::load_typespace;
use crate::util::{path_arg, read_input, require_union, str_arg};
use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches};
use std::io::{self, Write};
use std::path::PathBuf;
use tagwire::{EncodeOptions, Json, Typespace};

pub fn cli() -> clap::Command {
    clap::Command::new("decode")
        .about("Decodes a JSON document as a value of a declared union")
        .arg(common_args::union())
        .arg(
            Arg::new("input")
                .value_parser(clap::value_parser!(PathBuf))
                .help("The JSON document to decode; reads stdin when absent or `-`"),
        )
        .arg(common_args::schema())
        .arg(
            Arg::new("canonical")
                .long("canonical")
                .action(ArgAction::SetTrue)
                .help("Also print the value encoded back into JSON"),
        )
        .arg(common_args::empty_as_object().requires("canonical"))
}

pub fn exec(args: &ArgMatches) -> Result<(), anyhow::Error> {
    let ts = load_typespace(path_arg(args, "schema")?)?;
    let union = str_arg(args, "union")?;
    require_union(&ts, union)?;

    let input = read_input(args.get_one::<PathBuf>("input").map(PathBuf::as_path))?;
    let tree: Json = serde_json::from_str(&input).context("the input is not valid JSON")?;
    let opts = args.get_flag("canonical").then(|| EncodeOptions {
        empty_variant_as_object: args.get_flag("empty_as_object"),
    });
    decode(&ts, union, &tree, opts, &mut io::stdout().lock())
}

/// Prints the decoded value, then its re-encoding when `canonical` is given.
pub(crate) fn decode(
    ts: &Typespace,
    union: &str,
    tree: &Json,
    canonical: Option<EncodeOptions>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let value = ts
        .decode(union, tree)
        .with_context(|| format!("the input is not a valid `{union}`"))?;
    writeln!(out, "{}", ts.with_type(&value))?;
    if let Some(opts) = canonical {
        let encoded = ts.encode_with(&value, opts)?;
        writeln!(out, "{}", serde_json::to_string_pretty(&encoded)?)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeclarationFile;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn typespace() -> Typespace {
        DeclarationFile::from_toml(
            r#"
[[union]]
name = "Shape"
variants = [{ name = "Circle", type = "float" }, { name = "Empty" }, { name = "Poly", type = "list[Shape]" }]
"#,
        )
        .unwrap()
        .to_typespace()
        .unwrap()
    }

    fn run(tree: Json, canonical: Option<EncodeOptions>) -> anyhow::Result<String> {
        let mut out = Vec::new();
        decode(&typespace(), "Shape", &tree, canonical, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn prints_the_value() {
        let out = run(json!({"Poly": [{"Circle": 1.5}, "Empty"]}), None).unwrap();
        assert_eq!(out, "Shape.Poly([Shape.Circle(1.5), Shape.Empty])\n");
    }

    #[test]
    fn canonical_encoding() {
        let opts = EncodeOptions {
            empty_variant_as_object: true,
        };
        let out = run(json!({"Empty": null}), Some(opts)).unwrap();
        assert_eq!(out, "Shape.Empty\n{\n  \"Empty\": null\n}\n");
        let out = run(json!({"Empty": null}), Some(EncodeOptions::default())).unwrap();
        assert_eq!(out, "Shape.Empty\n\"Empty\"\n");
    }

    #[test]
    fn invalid_input_keeps_the_cause() {
        let err = run(json!({"Circle": "big"}), None).unwrap_err();
        assert_eq!(err.to_string(), "the input is not a valid `Shape`");
        assert_eq!(
            err.root_cause().to_string(),
            "expected a number, found a string at `$.Circle`"
        );
    }
}
