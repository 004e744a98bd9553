//! Schema front end.
//!
//! Reads XTP schema YAML and produces an IR [`Schema`](crate::ir::Schema).
//! The grammar is chosen by sniffing the `version: vN` marker before any
//! YAML parsing happens, so a document in the wrong grammar fails with a
//! version error rather than an obscure field error.

mod v0;
mod v1;

use crate::ir::Schema;
use regex::Regex;
use std::sync::LazyLock;

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^version: v(\d+)").expect("version pattern compiles"));

/// Error parsing schema text.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unable to find schema version")]
    MissingVersion,
    #[error("unsupported yaml version {0}")]
    UnsupportedVersion(String),
    #[error("invalid schema yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid custom type `{name}`: {reason}")]
    InvalidCustomType { name: String, reason: String },
    #[error("invalid property `{name}`: {reason}")]
    InvalidProperty { name: String, reason: String },
    #[error("unknown primitive type `{0}`")]
    UnknownPrimitive(String),
}

/// Grammar selected by the version marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    /// `version: v0`: exports are a bare list of names.
    Legacy,
    /// `version: v1...`: full exports, imports and custom types.
    Current,
}

/// Detect the grammar of a schema document from its version marker.
pub fn detect_grammar(text: &str) -> Result<Grammar, ParseError> {
    let caps = VERSION_RE
        .captures(text)
        .ok_or(ParseError::MissingVersion)?;
    match &caps[1] {
        "0" => Ok(Grammar::Legacy),
        "1" => Ok(Grammar::Current),
        other => Err(ParseError::UnsupportedVersion(other.to_string())),
    }
}

/// Parse an XTP extension plugin schema.
pub fn parse_schema(text: &str) -> Result<Schema, ParseError> {
    match detect_grammar(text)? {
        Grammar::Legacy => v0::parse(text),
        Grammar::Current => v1::parse(text),
    }
}

impl Schema {
    /// Serialize the schema back to YAML in the current grammar.
    pub fn to_yaml(&self) -> Result<String, ParseError> {
        Ok(serde_yaml::to_string(&v1::RawSchema::from(self))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_versions() {
        assert_eq!(detect_grammar("version: v0\n").unwrap(), Grammar::Legacy);
        assert_eq!(
            detect_grammar("# comment\nversion: v1-draft\n").unwrap(),
            Grammar::Current
        );
    }

    #[test]
    fn missing_version_is_an_error() {
        let err = parse_schema("exports: []\n").unwrap_err();
        assert!(matches!(err, ParseError::MissingVersion));
        // The marker must start a line.
        let err = parse_schema("  version: v1\n").unwrap_err();
        assert!(matches!(err, ParseError::MissingVersion));
    }

    #[test]
    fn unsupported_version_reports_number() {
        let err = parse_schema("version: v2\nexports: []\n").unwrap_err();
        assert_eq!(err.to_string(), "unsupported yaml version 2");
    }

    #[test]
    fn yaml_syntax_error_surfaces() {
        let err = parse_schema("version: v1-draft\nexports: [\n").unwrap_err();
        assert!(matches!(err, ParseError::Yaml(_)));
    }
}
