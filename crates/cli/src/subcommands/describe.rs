use crate::common_args;
use crate::config::load_typespace;
use crate::util::path_arg;
use clap::ArgMatches;
use std::io::{self, Write};
use tagwire::{TypeDef, Typespace};

pub fn cli() -> clap::Command {
    clap::Command::new("describe")
        .about("Lists the declared records and unions, with the wire name of every variant")
        .arg(common_args::schema())
}

pub fn exec(args: &ArgMatches) -> Result<(), anyhow::Error> {
    let ts = load_typespace(path_arg(args, "schema")?)?;
    describe(&ts, &mut io::stdout().lock())?;
    Ok(())
}

pub(crate) fn describe(ts: &Typespace, out: &mut impl Write) -> io::Result<()> {
    for (_, def) in ts.iter() {
        match def {
            TypeDef::Record(record) => {
                writeln!(out, "record {}", record.name)?;
                for field in &record.fields {
                    writeln!(out, "  {}: {}", field.name, field.ty)?;
                }
            }
            TypeDef::Union(union) => {
                writeln!(out, "union {} ({})", union.name, union.tagging)?;
                for variant in union.variants() {
                    write!(out, "  {}", variant.declared_name)?;
                    if let Some(ty) = &variant.payload {
                        write!(out, "({ty})")?;
                    }
                    if variant.wire_name != variant.declared_name {
                        write!(out, " as {:?}", &*variant.wire_name)?;
                    }
                    writeln!(out)?;
                }
            }
        }
    }
    Ok(())
}
