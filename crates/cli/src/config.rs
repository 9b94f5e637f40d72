use crate::errors::CliError;
use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tagwire::{PayloadType, RecordType, Tagging, Typespace, UnionType, VariantDescriptor};

/// A file declaring records and unions, in TOML or JSON.
///
/// ```toml
/// [[record]]
/// name = "Post"
/// fields = [{ name = "title", type = "str" }]
///
/// [[union]]
/// name = "Feed"
/// tag = "type"
/// variants = [{ name = "Post", type = "Post" }, { name = "Nothing" }]
/// ```
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DeclarationFile {
    #[serde(default, rename = "record")]
    pub records: Vec<RecordDecl>,
    #[serde(default, rename = "union")]
    pub unions: Vec<UnionDecl>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RecordDecl {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub deny_unknown_fields: bool,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct UnionDecl {
    pub name: String,
    /// The tag field; absent for external tagging.
    pub tag: Option<String>,
    /// The content field; requires `tag`.
    pub content: Option<String>,
    pub variants: Vec<VariantDecl>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct VariantDecl {
    pub name: String,
    /// The payload type expression; absent for variants without payload.
    #[serde(rename = "type")]
    pub ty: Option<String>,
    pub rename: Option<String>,
}

impl DeclarationFile {
    /// Reads `path`, choosing the format by its extension.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("failed to read `{}`", path.display()))?;
        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
        let file = match extension {
            "toml" => Self::from_toml(&text),
            "json" => Self::from_json(&text),
            _ => {
                return Err(CliError::UnsupportedFormat {
                    path: path.to_path_buf(),
                }
                .into())
            }
        };
        file.with_context(|| format!("failed to parse `{}`", path.display()))
    }

    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Declares every record, then every union, in file order.
    ///
    /// Names may refer to types declared later in the file;
    /// those are resolved when a codec is first needed.
    pub fn to_typespace(&self) -> anyhow::Result<Typespace> {
        let mut ts = Typespace::new();
        for decl in &self.records {
            let mut record = RecordType::new(decl.name.as_str());
            for field in &decl.fields {
                let ty = parse_type(&field.ty).with_context(|| format!("in field `{}.{}`", decl.name, field.name))?;
                record = record.with_field(field.name.as_str(), ty);
            }
            if decl.deny_unknown_fields {
                record = record.deny_unknown_fields();
            }
            ts.declare_record(record)?;
        }
        for decl in &self.unions {
            let tagging = Tagging::from_fields(&decl.name, decl.tag.as_deref(), decl.content.as_deref())?;
            let mut union = UnionType::builder(decl.name.as_str()).tagging(tagging);
            for variant in &decl.variants {
                let mut descriptor = match &variant.ty {
                    Some(ty) => {
                        let ty = parse_type(ty).with_context(|| format!("in variant `{}.{}`", decl.name, variant.name))?;
                        VariantDescriptor::new(variant.name.as_str(), ty)
                    }
                    None => VariantDescriptor::unit(variant.name.as_str()),
                };
                if let Some(rename) = &variant.rename {
                    descriptor = descriptor.renamed(rename.as_str());
                }
                union = union.with(descriptor);
            }
            ts.declare_union(union.build()?)?;
        }
        log::debug!("loaded {} declared types", ts.len());
        Ok(ts)
    }
}

fn parse_type(expr: &str) -> anyhow::Result<PayloadType> {
    Ok(PayloadType::parse(expr)?)
}

/// Loads the declaration file at `path` into a typespace.
pub fn load_typespace(path: &Path) -> anyhow::Result<Typespace> {
    DeclarationFile::load(path)?.to_typespace()
}
