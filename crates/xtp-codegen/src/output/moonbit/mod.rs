//! MoonBit target.
//!
//! Optional values use the option type (`T?`, `Some(..)`/`None`). Generated
//! plugins use the Extism MoonBit PDK (`@host`) and the core `@json` package.

mod host;
mod plugin;
mod roundtrip;
mod types;

use super::naming::{is_identifier, lower_snake_case, quote, upper_camel};
use super::view::ViewSet;
use crate::ir::Primitive;
use crate::resolve::{Node, NodeType, ResolvedSchema, TypeId};
use crate::traits::{Backend, IdentKind, TypeMapper, UnsupportedNodeError};
use std::fmt::Write;

const KEYWORDS: &[&str] = &[
    "and", "as", "async", "break", "catch", "const", "continue", "defer", "derive", "else",
    "enum", "enumview", "extern", "false", "fn", "fnalias", "for", "guard", "if", "impl",
    "import", "in", "is", "let", "letrec", "loop", "match", "mut", "noraise", "priv", "pub",
    "raise", "readonly", "return", "self", "struct", "suberror", "test", "throw", "trait",
    "traitalias", "true", "try", "type", "typealias", "using", "while", "with",
];

/// Type names declared by every generated types file.
const RESERVED_TYPES: &[&str] = &["Json", "ParseError", "XTPSchema"];

/// Static instance of the MoonBit backend for the registry.
pub static MOONBIT_BACKEND: MoonBitBackend = MoonBitBackend;

/// MoonBit backend implementing the Backend trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoonBitBackend;

impl MoonBitBackend {
    fn primitive(node: &Node) -> Result<&'static str, UnsupportedNodeError> {
        match &node.ty {
            NodeType::Primitive(Primitive::Integer) => Ok("Int"),
            NodeType::Primitive(Primitive::String) => Ok("String"),
            NodeType::Primitive(Primitive::Number) => Ok("Double"),
            NodeType::Primitive(Primitive::Boolean) => Ok("Bool"),
            NodeType::Primitive(kind) => Err(UnsupportedNodeError::new(node, *kind)),
            NodeType::Struct { .. } | NodeType::Enum { .. } => Ok(""),
        }
    }

    /// The struct's constructor result with required fields overridden.
    fn struct_literal(
        &self,
        schema: &ResolvedSchema,
        id: TypeId,
    ) -> Result<String, UnsupportedNodeError> {
        let name = &schema.get(id).name;
        let fields = schema
            .required_fields(id)
            .map(|f| -> Result<String, UnsupportedNodeError> {
                Ok(format!("{}: {}", self.field_ident(&f.name), self.zero_value(schema, f)?))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if fields.is_empty() {
            return Ok(format!("{name}::new()"));
        }
        Ok(format!("{{ ..{name}::new(), {} }}", fields.join(", ")))
    }

    fn value(
        &self,
        schema: &ResolvedSchema,
        node: &Node,
        sample: bool,
    ) -> Result<String, UnsupportedNodeError> {
        Self::primitive(node)?;
        let value = match &node.ty {
            NodeType::Primitive(Primitive::Integer) => {
                (if sample { "42" } else { "0" }).to_string()
            }
            NodeType::Primitive(Primitive::Number) => {
                (if sample { "4.5" } else { "0.0" }).to_string()
            }
            NodeType::Primitive(Primitive::String) => quote(&node.name),
            NodeType::Primitive(_) => "true".to_string(),
            NodeType::Enum {
                name,
                first_variant,
                ..
            } => format!("{name}::{}", self.variant_ident(name, first_variant)),
            NodeType::Struct { id, .. } => self.struct_literal(schema, *id)?,
        };
        Ok(if node.is_required {
            value
        } else {
            format!("Some({value})")
        })
    }
}

impl TypeMapper for MoonBitBackend {
    fn type_expression(
        &self,
        _schema: &ResolvedSchema,
        node: &Node,
    ) -> Result<String, UnsupportedNodeError> {
        let base = match node.type_name() {
            Some(name) => name,
            None => Self::primitive(node)?,
        };
        Ok(if node.is_required {
            base.to_string()
        } else {
            format!("{base}?")
        })
    }

    fn zero_value(
        &self,
        schema: &ResolvedSchema,
        node: &Node,
    ) -> Result<String, UnsupportedNodeError> {
        self.value(schema, node, false)
    }

    fn sample_value(
        &self,
        schema: &ResolvedSchema,
        node: &Node,
    ) -> Result<String, UnsupportedNodeError> {
        self.value(schema, node, true)
    }

    fn default_value(
        &self,
        _schema: &ResolvedSchema,
        node: &Node,
    ) -> Result<String, UnsupportedNodeError> {
        Self::primitive(node)?;
        if !node.is_required {
            return Ok("None".to_string());
        }
        Ok(match &node.ty {
            NodeType::Primitive(Primitive::Integer) => "0".to_string(),
            NodeType::Primitive(Primitive::Number) => "0.0".to_string(),
            NodeType::Primitive(Primitive::String) => "\"\"".to_string(),
            NodeType::Primitive(_) => "false".to_string(),
            NodeType::Enum {
                name,
                first_variant,
                ..
            } => format!("{name}::{}", self.variant_ident(name, first_variant)),
            NodeType::Struct { name, .. } => format!("{name}::new()"),
        })
    }

    /// Primitives decode through the `json_as_*` helpers emitted with the
    /// types; custom types through their own `from_json`.
    fn decoder(&self, node: &Node) -> Result<String, UnsupportedNodeError> {
        Self::primitive(node)?;
        Ok(match &node.ty {
            NodeType::Primitive(Primitive::Integer) => "json_as_int".to_string(),
            NodeType::Primitive(Primitive::Number) => "json_as_double".to_string(),
            NodeType::Primitive(Primitive::String) => "json_as_string".to_string(),
            NodeType::Primitive(_) => "json_as_bool".to_string(),
            NodeType::Struct { name, .. } | NodeType::Enum { name, .. } => {
                format!("{name}::from_json")
            }
        })
    }

    fn field_ident(&self, name: &str) -> String {
        lower_snake_case(name)
    }

    fn variant_ident(&self, _enum_name: &str, variant: &str) -> String {
        upper_camel(variant)
    }

    fn function_ident(&self, name: &str) -> String {
        lower_snake_case(name)
    }

    fn entry_point_ident(&self, name: &str) -> String {
        format!("{}_export", lower_snake_case(name))
    }

    fn host_import_ident(&self, name: &str) -> String {
        format!("host_{}", lower_snake_case(name))
    }

    fn is_valid_ident(&self, kind: IdentKind, ident: &str) -> bool {
        if !is_identifier(ident) || KEYWORDS.contains(&ident) {
            return false;
        }
        let upper = ident.starts_with(|c: char| c.is_ascii_uppercase());
        match kind {
            IdentKind::Package => true,
            IdentKind::Type => upper && !RESERVED_TYPES.contains(&ident),
            IdentKind::Variant => upper,
            // `__` names are the generated codecs' locals
            IdentKind::Field => !upper && !ident.starts_with("__"),
            IdentKind::Function => !upper,
        }
    }
}

impl Backend for MoonBitBackend {
    fn name(&self) -> &'static str {
        "mbt"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["moonbit", "MoonBit", "moon"]
    }

    fn extension(&self) -> &'static str {
        "mbt"
    }

    fn render_types(&self, views: &ViewSet) -> Result<String, std::fmt::Error> {
        types::render(views)
    }

    fn render_tests(&self, views: &ViewSet) -> Result<String, std::fmt::Error> {
        roundtrip::render(views)
    }

    fn render_stubs(&self, views: &ViewSet) -> Result<String, std::fmt::Error> {
        plugin::render_stubs(views)
    }

    fn render_dispatch(&self, views: &ViewSet) -> Result<String, std::fmt::Error> {
        plugin::render_dispatch(views)
    }

    fn render_host(&self, views: &ViewSet) -> Result<String, std::fmt::Error> {
        host::render(views)
    }
}

/// Start a top-level block (`///|`) with optional doc lines.
fn write_block(out: &mut String, doc: &[String]) -> std::fmt::Result {
    out.push_str("///|\n");
    write_doc(out, "", doc)
}

fn write_doc(out: &mut String, indent: &str, lines: &[String]) -> std::fmt::Result {
    for line in lines {
        if line.is_empty() {
            writeln!(out, "{indent}///")?;
        } else {
            writeln!(out, "{indent}/// {line}")?;
        }
    }
    Ok(())
}
