//! Code generation engine.
//!
//! [`generate`] turns a [`ResolvedSchema`] into an [`ArtifactSet`] for one
//! [`Backend`]. The engine prepares views through the backend's type mapper
//! (see [`view`]) and hands them to the backend's renderers; renderers never
//! see the schema itself.

pub mod json;
pub mod naming;
pub mod view;

#[cfg(feature = "backend-go")]
pub mod go;

#[cfg(feature = "backend-moonbit")]
pub mod moonbit;

#[cfg(feature = "backend-go")]
pub use go::{GO_BACKEND, GoBackend};

#[cfg(feature = "backend-moonbit")]
pub use moonbit::{MOONBIT_BACKEND, MoonBitBackend};

use crate::resolve::ResolvedSchema;
use crate::traits::{Backend, IdentKind, UnsupportedNodeError};
use std::collections::BTreeMap;
use view::ViewSet;

/// Which artifact families to emit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Layout {
    /// Types and their round-trip tests, in the named package.
    Types,
    /// A complete plugin: types, tests, dispatch, stubs and host calls.
    #[default]
    Plugin,
}

/// Options for [`generate`].
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Package name; also the base name of the types artifact. Must be a
    /// valid identifier in the target.
    pub package: String,
    pub layout: Layout,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            package: "plugin".to_string(),
            layout: Layout::default(),
        }
    }
}

/// The four kinds of generated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ArtifactFamily {
    Types,
    Tests,
    Dispatch,
    HostCalls,
}

/// One generated file.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub family: ArtifactFamily,
    pub contents: String,
}

/// Generated files keyed by file name.
pub type ArtifactSet = BTreeMap<String, Artifact>;

/// Error generating code.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error(transparent)]
    Unsupported(#[from] UnsupportedNodeError),
    #[error("empty literal generated for `{node}`")]
    EmptyLiteral { node: String },
    #[error("`{name}` maps to `{ident}`, which is not a valid {kind} name")]
    InvalidIdentifier {
        kind: IdentKind,
        name: String,
        ident: String,
    },
    #[error("`{first}` and `{second}` both map to `{ident}` in {scope}")]
    DuplicateIdentifier {
        ident: String,
        first: String,
        second: String,
        scope: String,
    },
    #[error("artifact `{0}` would be generated twice")]
    DuplicateArtifact(String),
    #[error("code generation not supported for version v0")]
    LegacySchema,
    #[error("formatting failed")]
    Fmt(#[from] std::fmt::Error),
}

/// Generate every artifact `options.layout` calls for.
pub fn generate(
    schema: &ResolvedSchema,
    backend: &dyn Backend,
    options: &GenerateOptions,
) -> Result<ArtifactSet, GenerationError> {
    if schema.is_legacy() {
        return Err(GenerationError::LegacySchema);
    }

    let views = ViewSet::build(schema, backend, options).inspect_err(|err| {
        if let GenerationError::Unsupported(e) = err {
            tracing::error!(
                backend = backend.name(),
                node = %e.node,
                kind = %e.kind,
                "unsupported type"
            );
        }
    })?;

    let ext = backend.extension();
    let mut artifacts = ArtifactSet::new();
    let mut add = |name: String, family: ArtifactFamily, contents: String| {
        tracing::debug!(artifact = %name, ?family, bytes = contents.len(), "generated");
        if artifacts.contains_key(&name) {
            return Err(GenerationError::DuplicateArtifact(name));
        }
        artifacts.insert(name, Artifact { family, contents });
        Ok(())
    };

    add(
        format!("{}.{ext}", options.package),
        ArtifactFamily::Types,
        backend.render_types(&views)?,
    )?;
    add(
        format!("{}_test.{ext}", options.package),
        ArtifactFamily::Tests,
        backend.render_tests(&views)?,
    )?;

    if options.layout == Layout::Plugin {
        add(
            format!("main.{ext}"),
            ArtifactFamily::Dispatch,
            backend.render_stubs(&views)?,
        )?;
        add(
            format!("plugin-functions.{ext}"),
            ArtifactFamily::Dispatch,
            backend.render_dispatch(&views)?,
        )?;
        if !views.imports.is_empty() {
            add(
                format!("host-functions.{ext}"),
                ArtifactFamily::HostCalls,
                backend.render_host(&views)?,
            )?;
        }
    }

    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{CustomType, Export, Param, Primitive, Property, Schema, ValueType};
    use crate::registry::backend;
    use crate::resolve::resolve;

    fn small() -> ResolvedSchema {
        let mut schema = Schema::new("v1-draft");
        schema.custom_types = vec![
            CustomType::enumeration("Fruit", vec!["apple", "orange"]),
            CustomType::structure(
                "Basket",
                vec![
                    Property::new("fruit", ValueType::reference("Fruit")),
                    Property::new("count", ValueType::primitive(Primitive::Integer)),
                ],
                vec!["fruit"],
            ),
        ];
        schema.exports.push(Export {
            name: "fill".into(),
            input: Some(Param::new(ValueType::reference("Fruit"))),
            output: Some(Param::new(ValueType::reference("Basket"))),
            ..Export::default()
        });
        resolve(&schema).unwrap()
    }

    fn names(set: &ArtifactSet) -> Vec<&str> {
        set.keys().map(String::as_str).collect()
    }

    #[test]
    fn plugin_layout_artifacts() {
        let go = backend("go").unwrap();
        let opts = GenerateOptions {
            package: "fruit".into(),
            layout: Layout::Plugin,
        };
        let set = generate(&small(), go, &opts).unwrap();
        assert_eq!(
            names(&set),
            ["fruit.go", "fruit_test.go", "main.go", "plugin-functions.go"]
        );
        assert_eq!(set["fruit.go"].family, ArtifactFamily::Types);
        assert_eq!(set["plugin-functions.go"].family, ArtifactFamily::Dispatch);
    }

    #[test]
    fn types_layout_artifacts() {
        let mbt = backend("mbt").unwrap();
        let opts = GenerateOptions {
            package: "fruit".into(),
            layout: Layout::Types,
        };
        let set = generate(&small(), mbt, &opts).unwrap();
        assert_eq!(names(&set), ["fruit.mbt", "fruit_test.mbt"]);
    }

    #[test]
    fn package_named_main_collides_with_stubs() {
        let go = backend("go").unwrap();
        let opts = GenerateOptions {
            package: "main".into(),
            layout: Layout::Plugin,
        };
        let err = generate(&small(), go, &opts).unwrap_err();
        assert!(matches!(err, GenerationError::DuplicateArtifact(ref n) if n == "main.go"));
    }

    #[test]
    fn package_must_be_an_identifier() {
        let opts = GenerateOptions {
            package: "my-types".into(),
            layout: Layout::Types,
        };
        for name in ["go", "mbt"] {
            let err = generate(&small(), backend(name).unwrap(), &opts).unwrap_err();
            assert!(matches!(
                err,
                GenerationError::InvalidIdentifier { kind: IdentKind::Package, ref ident, .. }
                    if ident == "my-types"
            ));
        }
        let opts = GenerateOptions {
            package: "func".into(),
            layout: Layout::Types,
        };
        let err = generate(&small(), backend("go").unwrap(), &opts).unwrap_err();
        assert_eq!(err.to_string(), "`func` maps to `func`, which is not a valid package name");
    }

    #[test]
    fn legacy_schemas_are_rejected() {
        let resolved = resolve(&Schema::new("v0")).unwrap();
        let go = backend("go").unwrap();
        assert!(matches!(
            generate(&resolved, go, &GenerateOptions::default()),
            Err(GenerationError::LegacySchema)
        ));
    }

    #[test]
    fn generation_is_deterministic() {
        let schema = small();
        let opts = GenerateOptions {
            package: "fruit".into(),
            layout: Layout::Plugin,
        };
        for name in ["go", "mbt"] {
            let b = backend(name).unwrap();
            assert_eq!(
                generate(&schema, b, &opts).unwrap(),
                generate(&schema, b, &opts).unwrap()
            );
        }
    }
}
