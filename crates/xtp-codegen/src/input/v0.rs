//! Legacy grammar: a version and a list of export names.

use super::ParseError;
use crate::ir::{Export, Schema};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RawSchemaV0 {
    version: String,
    #[serde(default)]
    exports: Vec<String>,
}

pub(super) fn parse(text: &str) -> Result<Schema, ParseError> {
    let raw: RawSchemaV0 = serde_yaml::from_str(text)?;
    Ok(Schema {
        version: raw.version,
        exports: raw
            .exports
            .into_iter()
            .map(|name| Export {
                name,
                ..Export::default()
            })
            .collect(),
        imports: Vec::new(),
        custom_types: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_names_become_exports() {
        let schema = parse("version: v0\nexports: [myExport, processUser]\n").unwrap();
        assert_eq!(schema.version, "v0");
        assert!(schema.is_legacy());
        let names: Vec<_> = schema.exports.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["myExport", "processUser"]);
        assert!(schema.exports[0].input.is_none());
        assert!(schema.custom_types.is_empty());
    }
}
