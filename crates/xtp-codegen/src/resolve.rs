//! Reference resolution.
//!
//! Turns a parsed [`Schema`] into a [`ResolvedSchema`]: every `$ref` is bound
//! to the custom type it names, every struct field knows whether it is
//! required, and struct reference cycles are rejected. Code generation only
//! ever sees resolved data.

use crate::ir::{CustomTypeKind, Param, Primitive, Property, Schema, ValueType};
use std::collections::HashMap;

/// Index of a custom type within [`ResolvedSchema::types`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub usize);

/// Error resolving references in a schema.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("unknown reference `{name}` in {location}")]
    UnknownReference { name: String, location: String },
    #[error("type `{ty}` lists `{name}` as required but has no such property")]
    InvalidRequiredName { ty: String, name: String },
    #[error("custom type `{0}` is declared more than once")]
    DuplicateType(String),
    #[error("{kind} `{name}` is declared more than once")]
    DuplicateFunction { kind: &'static str, name: String },
    #[error("reference cycle: {}", .0.join(" -> "))]
    ReferenceCycle(Vec<String>),
}

/// A schema with all references bound.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSchema {
    pub version: String,
    /// Custom types in declaration order; `types[id.0].id == id`.
    pub types: Vec<ResolvedType>,
    pub exports: Vec<ResolvedFunction>,
    pub imports: Vec<ResolvedFunction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedType {
    pub id: TypeId,
    pub name: String,
    pub description: String,
    pub content_type: Option<String>,
    pub kind: ResolvedKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedKind {
    Enum { variants: Vec<String> },
    Struct { fields: Vec<Node> },
}

/// An export or import with resolved payloads.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFunction {
    pub name: String,
    pub description: String,
    pub input: Option<Node>,
    pub output: Option<Node>,
}

/// A resolved struct property or function payload.
///
/// Payload nodes are named `input`/`output` and are always required.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub description: String,
    pub is_required: bool,
    pub ty: NodeType,
    pub format: Option<String>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeType {
    Primitive(Primitive),
    Struct {
        id: TypeId,
        name: String,
    },
    Enum {
        id: TypeId,
        name: String,
        /// Cached so mappers need no lookup for enum literals.
        first_variant: String,
    },
}

impl Node {
    /// Name of the referenced custom type, if any.
    pub fn type_name(&self) -> Option<&str> {
        match &self.ty {
            NodeType::Primitive(_) => None,
            NodeType::Struct { name, .. } | NodeType::Enum { name, .. } => Some(name),
        }
    }

    pub fn is_date_time(&self) -> bool {
        matches!(self.ty, NodeType::Primitive(Primitive::String))
            && self.format.as_deref() == Some("date-time")
    }
}

impl ResolvedType {
    pub fn is_enum(&self) -> bool {
        matches!(self.kind, ResolvedKind::Enum { .. })
    }

    pub fn fields(&self) -> &[Node] {
        match &self.kind {
            ResolvedKind::Struct { fields } => fields,
            ResolvedKind::Enum { .. } => &[],
        }
    }

    pub fn variants(&self) -> &[String] {
        match &self.kind {
            ResolvedKind::Enum { variants } => variants,
            ResolvedKind::Struct { .. } => &[],
        }
    }
}

impl ResolvedSchema {
    pub fn get(&self, id: TypeId) -> &ResolvedType {
        &self.types[id.0]
    }

    pub fn find(&self, name: &str) -> Option<&ResolvedType> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn structs(&self) -> impl Iterator<Item = &ResolvedType> {
        self.types.iter().filter(|t| !t.is_enum())
    }

    pub fn enums(&self) -> impl Iterator<Item = &ResolvedType> {
        self.types.iter().filter(|t| t.is_enum())
    }

    /// Required fields of a struct, in declaration order.
    pub fn required_fields(&self, id: TypeId) -> impl Iterator<Item = &Node> {
        self.get(id).fields().iter().filter(|f| f.is_required)
    }

    pub fn is_legacy(&self) -> bool {
        self.version == "v0"
    }
}

/// Resolve all references in a schema.
pub fn resolve(schema: &Schema) -> Result<ResolvedSchema, ResolutionError> {
    let mut index: HashMap<&str, TypeId> = HashMap::new();
    for (i, ct) in schema.custom_types.iter().enumerate() {
        if index.insert(ct.name.as_str(), TypeId(i)).is_some() {
            return Err(ResolutionError::DuplicateType(ct.name.clone()));
        }
    }
    check_unique("export", schema.exports.iter().map(|e| e.name.as_str()))?;
    check_unique("import", schema.imports.iter().map(|i| i.name.as_str()))?;

    let resolver = Resolver { schema, index };

    let mut types = Vec::with_capacity(schema.custom_types.len());
    for (i, ct) in schema.custom_types.iter().enumerate() {
        let kind = match &ct.kind {
            CustomTypeKind::Enum(e) => ResolvedKind::Enum {
                variants: e.variants.clone(),
            },
            CustomTypeKind::Struct(s) => {
                if let Some(name) = s
                    .required
                    .iter()
                    .find(|r| !s.properties.iter().any(|p| &p.name == *r))
                {
                    return Err(ResolutionError::InvalidRequiredName {
                        ty: ct.name.clone(),
                        name: name.clone(),
                    });
                }
                let fields = s
                    .properties
                    .iter()
                    .map(|p| resolver.property(&ct.name, p, s.required.contains(&p.name)))
                    .collect::<Result<_, _>>()?;
                ResolvedKind::Struct { fields }
            }
        };
        types.push(ResolvedType {
            id: TypeId(i),
            name: ct.name.clone(),
            description: ct.description.clone(),
            content_type: ct.content_type.clone(),
            kind,
        });
    }

    let exports = schema
        .exports
        .iter()
        .map(|e| resolver.function("export", &e.name, &e.description, &e.input, &e.output))
        .collect::<Result<_, _>>()?;
    let imports = schema
        .imports
        .iter()
        .map(|i| resolver.function("import", &i.name, &i.description, &i.input, &i.output))
        .collect::<Result<_, _>>()?;

    let resolved = ResolvedSchema {
        version: schema.version.clone(),
        types,
        exports,
        imports,
    };
    if let Some(cycle) = find_cycle(&resolved) {
        return Err(ResolutionError::ReferenceCycle(cycle));
    }
    tracing::debug!(
        types = resolved.types.len(),
        exports = resolved.exports.len(),
        imports = resolved.imports.len(),
        "resolved schema"
    );
    Ok(resolved)
}

fn check_unique<'a>(
    kind: &'static str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), ResolutionError> {
    let mut seen = std::collections::HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ResolutionError::DuplicateFunction {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

struct Resolver<'a> {
    schema: &'a Schema,
    index: HashMap<&'a str, TypeId>,
}

impl Resolver<'_> {
    fn node_type(&self, ty: &ValueType, location: &str) -> Result<NodeType, ResolutionError> {
        let name = match ty {
            ValueType::Primitive { kind, .. } => return Ok(NodeType::Primitive(*kind)),
            ValueType::Ref(r) => ty.ref_name().unwrap_or(r.as_str()),
        };
        let id = *self
            .index
            .get(name)
            .ok_or_else(|| ResolutionError::UnknownReference {
                name: name.to_string(),
                location: location.to_string(),
            })?;
        Ok(match &self.schema.custom_types[id.0].kind {
            CustomTypeKind::Struct(_) => NodeType::Struct {
                id,
                name: name.to_string(),
            },
            CustomTypeKind::Enum(e) => NodeType::Enum {
                id,
                name: name.to_string(),
                first_variant: e.variants.first().cloned().unwrap_or_default(),
            },
        })
    }

    fn property(
        &self,
        owner: &str,
        p: &Property,
        is_required: bool,
    ) -> Result<Node, ResolutionError> {
        let location = format!("{owner}.{}", p.name);
        Ok(Node {
            name: p.name.clone(),
            description: p.description.clone(),
            is_required,
            ty: self.node_type(&p.ty, &location)?,
            format: format_of(&p.ty),
            minimum: p.minimum,
            maximum: p.maximum,
        })
    }

    fn payload(
        &self,
        kind: &str,
        function: &str,
        slot: &str,
        param: &Option<Param>,
    ) -> Result<Option<Node>, ResolutionError> {
        let Some(param) = param else {
            return Ok(None);
        };
        let location = format!("{kind} {function} {slot}");
        Ok(Some(Node {
            name: slot.to_string(),
            description: param.description.clone(),
            is_required: true,
            ty: self.node_type(&param.ty, &location)?,
            format: format_of(&param.ty),
            minimum: None,
            maximum: None,
        }))
    }

    fn function(
        &self,
        kind: &str,
        name: &str,
        description: &str,
        input: &Option<Param>,
        output: &Option<Param>,
    ) -> Result<ResolvedFunction, ResolutionError> {
        Ok(ResolvedFunction {
            name: name.to_string(),
            description: description.to_string(),
            input: self.payload(kind, name, "input", input)?,
            output: self.payload(kind, name, "output", output)?,
        })
    }
}

fn format_of(ty: &ValueType) -> Option<String> {
    match ty {
        ValueType::Primitive { format, .. } => format.clone(),
        ValueType::Ref(_) => None,
    }
}

/// First struct reference cycle, as type names ending with the repeated one.
fn find_cycle(schema: &ResolvedSchema) -> Option<Vec<String>> {
    let graph: Vec<Vec<TypeId>> = schema
        .types
        .iter()
        .map(|t| {
            t.fields()
                .iter()
                .filter_map(|f| match f.ty {
                    NodeType::Struct { id, .. } => Some(id),
                    _ => None,
                })
                .collect()
        })
        .collect();

    let mut visited = vec![false; graph.len()];
    let mut on_stack = vec![false; graph.len()];
    let mut path = Vec::new();
    for start in 0..graph.len() {
        if !visited[start] {
            if let Some(cycle) =
                find_cycle_dfs(TypeId(start), &graph, &mut visited, &mut on_stack, &mut path)
            {
                return Some(
                    cycle
                        .into_iter()
                        .map(|id| schema.get(id).name.clone())
                        .collect(),
                );
            }
        }
    }
    None
}

fn find_cycle_dfs(
    node: TypeId,
    graph: &[Vec<TypeId>],
    visited: &mut [bool],
    on_stack: &mut [bool],
    path: &mut Vec<TypeId>,
) -> Option<Vec<TypeId>> {
    visited[node.0] = true;
    on_stack[node.0] = true;
    path.push(node);

    for &next in &graph[node.0] {
        if on_stack[next.0] {
            let pos = path.iter().position(|&id| id == next)?;
            let mut cycle = path[pos..].to_vec();
            cycle.push(next);
            return Some(cycle);
        }
        if !visited[next.0] {
            if let Some(cycle) = find_cycle_dfs(next, graph, visited, on_stack, path) {
                return Some(cycle);
            }
        }
    }

    path.pop();
    on_stack[node.0] = false;
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{CustomType, Export, Param, Property};

    fn string() -> ValueType {
        ValueType::primitive(Primitive::String)
    }

    fn fruit_schema() -> Schema {
        let mut schema = Schema::new("v1-draft");
        schema.custom_types = vec![
            CustomType::structure(
                "Basket",
                vec![
                    Property::new("fruit", ValueType::reference("Fruit")),
                    Property::new("label", string()),
                    Property::new("owner", ValueType::reference("Owner")),
                ],
                vec!["fruit", "label"],
            ),
            CustomType::enumeration("Fruit", vec!["apple", "orange"]),
            CustomType::structure("Owner", vec![Property::new("name", string())], vec!["name"]),
        ];
        schema.exports.push(Export {
            name: "weigh".into(),
            input: Some(Param::new(ValueType::reference("Basket"))),
            output: Some(Param::new(ValueType::primitive(Primitive::Number))),
            ..Export::default()
        });
        schema
    }

    #[test]
    fn resolves_forward_references() {
        let resolved = resolve(&fruit_schema()).unwrap();
        let basket = resolved.find("Basket").unwrap();
        let fields = basket.fields();
        assert_eq!(
            fields[0].ty,
            NodeType::Enum {
                id: TypeId(1),
                name: "Fruit".into(),
                first_variant: "apple".into()
            }
        );
        assert_eq!(
            fields[2].ty,
            NodeType::Struct {
                id: TypeId(2),
                name: "Owner".into()
            }
        );
        let required: Vec<_> = resolved
            .required_fields(basket.id)
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(required, ["fruit", "label"]);
        assert!(!fields[2].is_required);
    }

    #[test]
    fn payloads_are_required_nodes() {
        let resolved = resolve(&fruit_schema()).unwrap();
        let input = resolved.exports[0].input.as_ref().unwrap();
        assert_eq!(input.name, "input");
        assert!(input.is_required);
        assert_eq!(input.type_name(), Some("Basket"));
        let output = resolved.exports[0].output.as_ref().unwrap();
        assert_eq!(output.ty, NodeType::Primitive(Primitive::Number));
    }

    #[test]
    fn dangling_reference_names_location() {
        let mut schema = fruit_schema();
        schema.custom_types.remove(2);
        let err = resolve(&schema).unwrap_err();
        assert_eq!(err.to_string(), "unknown reference `Owner` in Basket.owner");
    }

    #[test]
    fn dangling_payload_reference() {
        let mut schema = Schema::new("v1-draft");
        schema.exports.push(Export {
            name: "eat".into(),
            input: Some(Param::new(ValueType::reference("Missing"))),
            ..Export::default()
        });
        let err = resolve(&schema).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown reference `Missing` in export eat input"
        );
    }

    #[test]
    fn required_name_must_be_a_property() {
        let mut schema = Schema::new("v1-draft");
        schema.custom_types.push(CustomType::structure(
            "S",
            vec![Property::new("a", string())],
            vec!["b"],
        ));
        let err = resolve(&schema).unwrap_err();
        assert!(matches!(
            err,
            ResolutionError::InvalidRequiredName { ref ty, ref name } if ty == "S" && name == "b"
        ));
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut schema = fruit_schema();
        schema
            .custom_types
            .push(CustomType::enumeration("Fruit", vec!["kiwi"]));
        assert!(matches!(
            resolve(&schema),
            Err(ResolutionError::DuplicateType(ref n)) if n == "Fruit"
        ));

        let mut schema = fruit_schema();
        let again = schema.exports[0].clone();
        schema.exports.push(again);
        assert!(matches!(
            resolve(&schema),
            Err(ResolutionError::DuplicateFunction { kind: "export", .. })
        ));
    }

    #[test]
    fn cycles_are_rejected() {
        let mut schema = Schema::new("v1-draft");
        schema.custom_types = vec![
            CustomType::structure(
                "A",
                vec![Property::new("b", ValueType::reference("B"))],
                vec![],
            ),
            CustomType::structure(
                "B",
                vec![Property::new("a", ValueType::reference("A"))],
                vec!["a"],
            ),
        ];
        let err = resolve(&schema).unwrap_err();
        assert_eq!(err.to_string(), "reference cycle: A -> B -> A");
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let mut schema = Schema::new("v1-draft");
        schema.custom_types = vec![CustomType::structure(
            "Tree",
            vec![Property::new("child", ValueType::reference("Tree"))],
            vec![],
        )];
        assert!(matches!(
            resolve(&schema),
            Err(ResolutionError::ReferenceCycle(ref path)) if path == &["Tree", "Tree"]
        ));
    }
}
