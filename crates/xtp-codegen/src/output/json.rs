//! Target-independent JSON oracles and wire schema strings.
//!
//! Every target serializes the same schema to the same JSON, so the expected
//! literals in generated tests are computed here once.

use super::naming::quote;
use crate::ir::Primitive;
use crate::resolve::{Node, NodeType, ResolvedSchema, TypeId};
use crate::traits::UnsupportedNodeError;

/// JSON text of a node's zero value.
pub fn zero_literal(schema: &ResolvedSchema, node: &Node) -> Result<String, UnsupportedNodeError> {
    literal(schema, node, false)
}

/// JSON text of a node's sample value.
pub fn sample_literal(
    schema: &ResolvedSchema,
    node: &Node,
) -> Result<String, UnsupportedNodeError> {
    literal(schema, node, true)
}

fn literal(
    schema: &ResolvedSchema,
    node: &Node,
    sample: bool,
) -> Result<String, UnsupportedNodeError> {
    Ok(match &node.ty {
        NodeType::Primitive(Primitive::Integer) => (if sample { "42" } else { "0" }).to_string(),
        NodeType::Primitive(Primitive::Number) => (if sample { "4.5" } else { "0" }).to_string(),
        NodeType::Primitive(Primitive::String) => quote(&node.name),
        NodeType::Primitive(Primitive::Boolean) => "true".to_string(),
        NodeType::Primitive(kind) => return Err(UnsupportedNodeError::new(node, *kind)),
        NodeType::Enum { first_variant, .. } => quote(first_variant),
        NodeType::Struct { id, .. } => required_object(schema, *id)?,
    })
}

/// A struct holding only its required fields at their zero values.
fn required_object(schema: &ResolvedSchema, id: TypeId) -> Result<String, UnsupportedNodeError> {
    let fields = schema.get(id).fields();
    let mut entries = Vec::with_capacity(fields.len());
    for field in fields {
        let value = if field.is_required {
            Some(zero_literal(schema, field)?)
        } else {
            None
        };
        entries.push((field.name.as_str(), value));
    }
    Ok(object(&entries))
}

/// Render `{"k":v,...}` over the present entries, in order.
///
/// A separator follows an entry only when some later entry is present.
pub fn object(entries: &[(&str, Option<String>)]) -> String {
    let mut out = String::from("{");
    for (i, (name, value)) in entries.iter().enumerate() {
        let Some(value) = value else {
            continue;
        };
        out.push_str(&quote(name));
        out.push(':');
        out.push_str(value);
        if has_next_present(entries, i) {
            out.push(',');
        }
    }
    out.push('}');
    out
}

fn has_next_present(entries: &[(&str, Option<String>)], index: usize) -> bool {
    entries[index + 1..].iter().any(|(_, v)| v.is_some())
}

/// Language-neutral type name: primitive name, `Date` for date-time strings,
/// or the referenced type name; prefixed with `?` when optional.
pub fn wire_schema(node: &Node) -> String {
    let base = match &node.ty {
        NodeType::Primitive(_) if node.is_date_time() => "Date",
        NodeType::Primitive(kind) => kind.as_str(),
        NodeType::Struct { name, .. } | NodeType::Enum { name, .. } => name.as_str(),
    };
    if node.is_required {
        base.to_string()
    } else {
        format!("?{base}")
    }
}
