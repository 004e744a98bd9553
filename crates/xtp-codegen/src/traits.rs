//! Traits implemented once per target language.
//!
//! [`TypeMapper`] answers every "what does this node look like in the target"
//! question; [`Backend`] adds the renderers that turn prepared views into
//! source files. The engine in [`crate::output`] only talks to targets through
//! these traits, so adding a language never touches it.

use crate::ir::Primitive;
use crate::output::json;
use crate::output::naming;
use crate::output::view::ViewSet;
use crate::resolve::{Node, ResolvedSchema};

/// A primitive kind with no complete mapping in a target.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("`{node}` has type {kind}, which has no complete type mapping")]
pub struct UnsupportedNodeError {
    pub node: String,
    pub kind: Primitive,
}

impl UnsupportedNodeError {
    pub fn new(node: &Node, kind: Primitive) -> Self {
        Self {
            node: node.name.clone(),
            kind,
        }
    }
}

/// What a generated identifier names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentKind {
    Package,
    Type,
    Field,
    Variant,
    Function,
}

impl std::fmt::Display for IdentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            IdentKind::Package => "package",
            IdentKind::Type => "type",
            IdentKind::Field => "field",
            IdentKind::Variant => "enum variant",
            IdentKind::Function => "function",
        })
    }
}

/// Maps resolved schema nodes onto one target's type system.
///
/// All methods are pure over `(schema, node)`. Scalar primitives (integer,
/// string, number, boolean) and references always map; object, array and
/// buffer return [`UnsupportedNodeError`] rather than a placeholder.
pub trait TypeMapper {
    /// Type as written in a declaration, wrapped when the node is optional.
    fn type_expression(
        &self,
        schema: &ResolvedSchema,
        node: &Node,
    ) -> Result<String, UnsupportedNodeError>;

    /// Minimal valid value: strings hold the node's own name, booleans are
    /// `true`, structs set only their required fields.
    fn zero_value(
        &self,
        schema: &ResolvedSchema,
        node: &Node,
    ) -> Result<String, UnsupportedNodeError>;

    /// Non-default value for fully populated fixtures.
    fn sample_value(
        &self,
        schema: &ResolvedSchema,
        node: &Node,
    ) -> Result<String, UnsupportedNodeError>;

    /// Value used by generated constructors and stub bodies.
    fn default_value(
        &self,
        schema: &ResolvedSchema,
        node: &Node,
    ) -> Result<String, UnsupportedNodeError>;

    /// Function that decodes JSON into a value of the node's type.
    fn decoder(&self, node: &Node) -> Result<String, UnsupportedNodeError>;

    /// JSON text of [`zero_value`](Self::zero_value).
    fn json_literal(
        &self,
        schema: &ResolvedSchema,
        node: &Node,
    ) -> Result<String, UnsupportedNodeError> {
        json::zero_literal(schema, node)
    }

    /// JSON text of [`sample_value`](Self::sample_value).
    fn sample_json_literal(
        &self,
        schema: &ResolvedSchema,
        node: &Node,
    ) -> Result<String, UnsupportedNodeError> {
        json::sample_literal(schema, node)
    }

    /// Language-neutral type description used by `get_schema` accessors.
    fn wire_schema_string(&self, node: &Node) -> String {
        json::wire_schema(node)
    }

    /// Identifier for a struct field.
    fn field_ident(&self, name: &str) -> String;

    /// Identifier for an enum variant of `enum_name`.
    fn variant_ident(&self, enum_name: &str, variant: &str) -> String;

    /// Identifier for the user-facing function behind an export or import.
    fn function_ident(&self, name: &str) -> String;

    /// Identifier for the wasm entry point of the export `name`.
    fn entry_point_ident(&self, name: &str) -> String;

    /// Identifier for the raw host import behind the caller of `name`.
    fn host_import_ident(&self, name: &str) -> String;

    /// Whether `ident` may name a `kind` in generated code.
    fn is_valid_ident(&self, _kind: IdentKind, ident: &str) -> bool {
        naming::is_identifier(ident)
    }

    /// Whether enum variants share the package namespace with types and
    /// functions, rather than living inside their enum.
    fn variants_in_package_scope(&self) -> bool {
        false
    }
}

/// A code generation target: type mapper plus file renderers.
///
/// Renderers only format the prepared [`ViewSet`]; every type, literal and
/// identifier in it was already produced by this backend's [`TypeMapper`].
pub trait Backend: TypeMapper + Send + Sync {
    /// Canonical target name (e.g. "go", "mbt").
    fn name(&self) -> &'static str;

    /// Other names accepted by the registry.
    fn aliases(&self) -> &'static [&'static str];

    /// File extension for generated code, without the dot.
    fn extension(&self) -> &'static str;

    /// Types and codecs.
    fn render_types(&self, views: &ViewSet) -> Result<String, std::fmt::Error>;

    /// Round-trip tests for the types.
    fn render_tests(&self, views: &ViewSet) -> Result<String, std::fmt::Error>;

    /// User-editable stubs, one per export.
    fn render_stubs(&self, views: &ViewSet) -> Result<String, std::fmt::Error>;

    /// Wasm entry points that decode input, call the stubs and encode output.
    fn render_dispatch(&self, views: &ViewSet) -> Result<String, std::fmt::Error>;

    /// Host function declarations and typed callers.
    fn render_host(&self, views: &ViewSet) -> Result<String, std::fmt::Error>;
}
