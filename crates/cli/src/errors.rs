use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Declaration error: `{}` is neither a `.toml` nor a `.json` file", path.display())]
    UnsupportedFormat { path: PathBuf },
    #[error("Declaration error: no union named `{name}` is declared, found: {declared}")]
    UnknownUnion { name: String, declared: String },
}
