//! Go target.
//!
//! Optional values are pointers (`*T`) with `omitempty` JSON tags. Generated
//! plugins build with TinyGo against `github.com/extism/go-pdk`.

mod host;
mod plugin;
mod roundtrip;
mod types;

use super::Layout;
use super::naming::{is_identifier, quote, upper_camel, upper_first};
use super::view::ViewSet;
use crate::ir::Primitive;
use crate::resolve::{Node, NodeType, ResolvedSchema, TypeId};
use crate::traits::{Backend, IdentKind, TypeMapper, UnsupportedNodeError};
use std::fmt::Write;

const KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range",
    "return", "select", "struct", "switch", "type", "var",
];

/// Methods generated on every struct; a field may not share their names.
const STRUCT_METHODS: &[&str] = &["GetSchema", "ToJSON", "UnmarshalJSON"];

/// Static instance of the Go backend for the registry.
pub static GO_BACKEND: GoBackend = GoBackend;

/// Go backend implementing the Backend trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoBackend;

impl GoBackend {
    fn primitive(node: &Node) -> Result<&'static str, UnsupportedNodeError> {
        match &node.ty {
            NodeType::Primitive(Primitive::Integer) => Ok("int"),
            NodeType::Primitive(Primitive::String) => Ok("string"),
            NodeType::Primitive(Primitive::Number) => Ok("float64"),
            NodeType::Primitive(Primitive::Boolean) => Ok("bool"),
            NodeType::Primitive(kind) => Err(UnsupportedNodeError::new(node, *kind)),
            NodeType::Struct { .. } | NodeType::Enum { .. } => Ok(""),
        }
    }

    /// `Name{Field: value, ...}` over the struct's required fields.
    fn struct_literal(
        &self,
        schema: &ResolvedSchema,
        id: TypeId,
    ) -> Result<String, UnsupportedNodeError> {
        let ty = schema.get(id);
        let fields = schema
            .required_fields(id)
            .map(|f| -> Result<String, UnsupportedNodeError> {
                Ok(format!("{}: {}", self.field_ident(&f.name), self.zero_value(schema, f)?))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(format!("{}{{{}}}", ty.name, fields.join(", ")))
    }

    fn value(
        &self,
        schema: &ResolvedSchema,
        node: &Node,
        sample: bool,
    ) -> Result<String, UnsupportedNodeError> {
        Self::primitive(node)?;
        let (value, is_struct) = match &node.ty {
            NodeType::Primitive(Primitive::Integer) => {
                ((if sample { "42" } else { "0" }).to_string(), false)
            }
            NodeType::Primitive(Primitive::Number) => {
                ((if sample { "4.5" } else { "0.0" }).to_string(), false)
            }
            NodeType::Primitive(Primitive::String) => (quote(&node.name), false),
            NodeType::Primitive(_) => ("true".to_string(), false),
            NodeType::Enum {
                name,
                first_variant,
                ..
            } => (self.variant_ident(name, first_variant), false),
            NodeType::Struct { id, .. } => (self.struct_literal(schema, *id)?, true),
        };
        Ok(match (node.is_required, is_struct) {
            (true, _) => value,
            (false, true) => format!("&{value}"),
            (false, false) => format!("ptr({value})"),
        })
    }

    /// Package clause for every generated file.
    fn package(views: &ViewSet) -> &str {
        match views.layout {
            Layout::Plugin => "main",
            Layout::Types => &views.package,
        }
    }
}

impl TypeMapper for GoBackend {
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
            format!("*{base}")
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
            return Ok("nil".to_string());
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
            } => self.variant_ident(name, first_variant),
            NodeType::Struct { name, .. } => format!("New{name}()"),
        })
    }

    /// Every Go value decodes through `encoding/json`; enums and structs
    /// carry their own `UnmarshalJSON`.
    fn decoder(&self, node: &Node) -> Result<String, UnsupportedNodeError> {
        Self::primitive(node)?;
        Ok("json.Unmarshal".to_string())
    }

    fn field_ident(&self, name: &str) -> String {
        upper_camel(name)
    }

    fn variant_ident(&self, enum_name: &str, variant: &str) -> String {
        format!("{enum_name}Enum{}", upper_camel(variant))
    }

    fn function_ident(&self, name: &str) -> String {
        upper_first(name)
    }

    fn entry_point_ident(&self, name: &str) -> String {
        format!("export{}", upper_first(name))
    }

    fn host_import_ident(&self, name: &str) -> String {
        format!("host{}", upper_first(name))
    }

    fn is_valid_ident(&self, kind: IdentKind, ident: &str) -> bool {
        if !is_identifier(ident) || KEYWORDS.contains(&ident) {
            return false;
        }
        match kind {
            IdentKind::Package => ident != "_",
            IdentKind::Type => ident != "XTPSchema",
            // encoding/json only sees exported fields
            IdentKind::Field => {
                ident.starts_with(|c: char| c.is_ascii_uppercase())
                    && !STRUCT_METHODS.contains(&ident)
            }
            IdentKind::Variant | IdentKind::Function => true,
        }
    }

    fn variants_in_package_scope(&self) -> bool {
        true
    }
}

impl Backend for GoBackend {
    fn name(&self) -> &'static str {
        "go"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["Go", "golang"]
    }

    fn extension(&self) -> &'static str {
        "go"
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

/// Write `// line` comments at the given indent.
fn write_doc(out: &mut String, indent: &str, lines: &[String]) -> std::fmt::Result {
    for line in lines {
        if line.is_empty() {
            writeln!(out, "{indent}//")?;
        } else {
            writeln!(out, "{indent}// {line}")?;
        }
    }
    Ok(())
}

/// Write an `import` clause, standard library paths first.
fn write_imports(out: &mut String, stdlib: &[&str], external: &[&str]) -> std::fmt::Result {
    match (stdlib, external) {
        ([], []) => Ok(()),
        ([one], []) | ([], [one]) => writeln!(out, "import \"{one}\"\n"),
        _ => {
            out.push_str("import (\n");
            for path in stdlib {
                writeln!(out, "\t\"{path}\"")?;
            }
            if !stdlib.is_empty() && !external.is_empty() {
                out.push('\n');
            }
            for path in external {
                writeln!(out, "\t\"{path}\"")?;
            }
            out.push_str(")\n\n");
            Ok(())
        }
    }
}

/// Receiver name for methods on `type_name`.
fn receiver(type_name: &str) -> String {
    type_name
        .chars()
        .next()
        .map(|c| c.to_lowercase().collect())
        .unwrap_or_else(|| "v".to_string())
}

/// JSON text as a Go string literal, raw when possible.
fn json_string(json: &str) -> String {
    if json.contains('`') {
        quote(json)
    } else {
        format!("`{json}`")
    }
}
