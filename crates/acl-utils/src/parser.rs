//! Rule-set description parsers
//!
//! Every format decodes into the same `RuleSetDescription`, so the field
//! names and the empty-list rule are identical whichever syntax a policy
//! author picks.

use crate::error::{Error, Result};
use acl_core::{EmptyListMode, Policy, RuleSetDescription};
use std::path::Path;

/// Trait for policy parsers (extensible to further formats)
pub trait PolicyParser {
    /// Decode a description without building the policy
    fn parse_description(&self, input: &str) -> Result<RuleSetDescription>;

    /// How explicitly empty lists are read
    fn empty_lists(&self) -> EmptyListMode;

    /// Parse and validate a policy
    fn parse(&self, input: &str) -> Result<Policy> {
        let description = self.parse_description(input)?;
        Ok(description.into_policy(self.empty_lists())?)
    }
}

macro_rules! parser {
    ($(#[$meta:meta])* $name:ident, |$input:ident| $decode:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name {
            empty_lists: EmptyListMode,
        }

        impl $name {
            /// Create a parser reading empty lists with `mode`
            pub fn new(mode: EmptyListMode) -> Self {
                Self { empty_lists: mode }
            }
        }

        impl PolicyParser for $name {
            fn parse_description(&self, $input: &str) -> Result<RuleSetDescription> {
                Ok($decode)
            }

            fn empty_lists(&self) -> EmptyListMode {
                self.empty_lists
            }
        }
    };
}

parser!(
    /// YAML parser implementation
    YamlParser,
    |input| serde_yaml::from_str(input)?
);

parser!(
    /// TOML parser implementation
    TomlParser,
    |input| toml::from_str(input)?
);

parser!(
    /// JSON parser implementation
    JsonParser,
    |input| serde_json::from_str(input)?
);

/// Description file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `.toml`
    Toml,
    /// `.yaml` / `.yml`
    Yaml,
    /// `.json`
    Json,
}

impl Format {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "toml" => Ok(Self::Toml),
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            _ => Err(Error::UnsupportedFormat(extension)),
        }
    }

    /// Parser for this format
    pub fn parser(self, mode: EmptyListMode) -> Box<dyn PolicyParser> {
        match self {
            Self::Toml => Box::new(TomlParser::new(mode)),
            Self::Yaml => Box::new(YamlParser::new(mode)),
            Self::Json => Box::new(JsonParser::new(mode)),
        }
    }

    /// Render a description in this format
    pub fn render(self, description: &RuleSetDescription) -> Result<String> {
        match self {
            Self::Toml => Ok(description.to_toml()?),
            Self::Yaml => Ok(serde_yaml::to_string(description)?),
            Self::Json => serde_json::to_string_pretty(description)
                .map_err(|e| Error::Serialize(e.to_string())),
        }
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a description file, choosing the parser by extension
pub fn load_description(path: impl AsRef<Path>) -> Result<RuleSetDescription> {
    let path = path.as_ref();
    let format = Format::from_path(path)?;
    let description = format
        .parser(EmptyListMode::default())
        .parse_description(&read(path)?)?;
    tracing::debug!(path = %path.display(), ?format, rules = description.rules.len(), "description read");
    Ok(description)
}

/// Read and build a policy from a description file
pub fn parse_file(path: impl AsRef<Path>, mode: EmptyListMode) -> Result<Policy> {
    let path = path.as_ref();
    let policy = Format::from_path(path)?.parser(mode).parse(&read(path)?)?;
    tracing::info!(path = %path.display(), policy = policy.id(), rules = policy.rules().len(), "policy loaded");
    Ok(policy)
}
