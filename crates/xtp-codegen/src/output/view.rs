//! Render-ready views.
//!
//! A [`ViewSet`] holds every identifier, type expression and literal a
//! renderer needs, already produced by the target's
//! [`TypeMapper`](crate::traits::TypeMapper). Renderers format views; they
//! never consult the schema or make type decisions.

use super::naming::{doc_lines, represents};
use super::{GenerateOptions, GenerationError, Layout};
use crate::ir::Primitive;
use crate::resolve::{Node, NodeType, ResolvedFunction, ResolvedSchema, ResolvedType};
use crate::traits::{Backend, IdentKind};
use std::collections::HashMap;

/// Everything one target needs to render a schema.
#[derive(Debug, Clone)]
pub struct ViewSet {
    pub package: String,
    pub layout: Layout,
    pub enums: Vec<EnumView>,
    pub structs: Vec<StructView>,
    pub exports: Vec<FunctionView>,
    pub imports: Vec<FunctionView>,
}

#[derive(Debug, Clone)]
pub struct EnumView {
    pub name: String,
    pub doc: Vec<String>,
    pub variants: Vec<VariantView>,
}

#[derive(Debug, Clone)]
pub struct VariantView {
    /// Target identifier.
    pub ident: String,
    /// Canonical text, as it appears in JSON.
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct StructView {
    pub name: String,
    pub doc: Vec<String>,
    pub fields: Vec<FieldView>,
}

#[derive(Debug, Clone)]
pub struct FieldView {
    /// JSON key.
    pub name: String,
    pub ident: String,
    pub doc: Vec<String>,
    pub type_expr: String,
    pub is_required: bool,
    pub default_value: String,
    pub zero_value: String,
    pub sample_value: String,
    pub zero_json: String,
    pub sample_json: String,
    pub wire: String,
    /// Function decoding this field's JSON value.
    pub decoder: String,
}

#[derive(Debug, Clone)]
pub struct FunctionView {
    /// Name on the wasm boundary.
    pub name: String,
    /// Name of the user-facing function.
    pub ident: String,
    /// Name of the generated function on the wasm boundary: the entry point
    /// of an export, or the raw import behind a host call.
    pub wasm_ident: String,
    pub doc: Vec<String>,
    pub input: Option<PayloadView>,
    pub output: Option<PayloadView>,
}

/// How a payload crosses the wasm boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadKind {
    /// A bare UTF-8 string.
    Text,
    /// A JSON-encoded primitive.
    Json,
    /// A JSON-encoded custom type.
    Reference { type_name: String },
}

#[derive(Debug, Clone)]
pub struct PayloadView {
    pub type_expr: String,
    pub doc: Vec<String>,
    pub kind: PayloadKind,
    pub default_value: String,
    /// Function decoding the payload's JSON value.
    pub decoder: String,
}

impl StructView {
    pub fn has_optional(&self) -> bool {
        self.fields.iter().any(|f| !f.is_required)
    }

    pub fn has_required(&self) -> bool {
        self.fields.iter().any(|f| f.is_required)
    }

    pub fn required(&self) -> impl Iterator<Item = &FieldView> {
        self.fields.iter().filter(|f| f.is_required)
    }

    /// Expected JSON of the fixture that sets only required fields.
    pub fn required_json(&self) -> String {
        let entries: Vec<_> = self
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.is_required.then(|| f.zero_json.clone())))
            .collect();
        super::json::object(&entries)
    }

    /// Expected JSON of the fixture that sets every field.
    pub fn full_json(&self) -> String {
        let entries: Vec<_> = self
            .fields
            .iter()
            .map(|f| (f.name.as_str(), Some(f.sample_json.clone())))
            .collect();
        super::json::object(&entries)
    }
}

impl FunctionView {
    /// Whether the user-facing function returns a value.
    pub fn returns(&self) -> bool {
        self.output.is_some()
    }
}

impl ViewSet {
    /// Prepare views for `backend`, failing on the first unmappable node.
    pub fn build(
        schema: &ResolvedSchema,
        backend: &dyn Backend,
        options: &GenerateOptions,
    ) -> Result<Self, GenerationError> {
        check_ident(backend, IdentKind::Package, &options.package, &options.package)?;

        let mut enums = Vec::new();
        let mut structs = Vec::new();
        for ty in &schema.types {
            if ty.is_enum() {
                enums.push(enum_view(backend, ty));
            } else {
                structs.push(struct_view(schema, backend, ty)?);
            }
        }
        let exports = schema
            .exports
            .iter()
            .map(|f| function_view(schema, backend, f, backend.entry_point_ident(&f.name)))
            .collect::<Result<_, _>>()?;
        let imports = schema
            .imports
            .iter()
            .map(|f| function_view(schema, backend, f, backend.host_import_ident(&f.name)))
            .collect::<Result<_, _>>()?;
        let views = Self {
            package: options.package.clone(),
            layout: options.layout,
            enums,
            structs,
            exports,
            imports,
        };
        views.check_identifiers(backend)?;
        Ok(views)
    }

    /// Reject identifiers the target cannot declare, and distinct schema
    /// names that map to the same identifier within one scope.
    fn check_identifiers(&self, backend: &dyn Backend) -> Result<(), GenerationError> {
        let mut package = Scope::new(format!("package `{}`", self.package));
        for e in &self.enums {
            check_ident(backend, IdentKind::Type, &e.name, &e.name)?;
            package.claim(&e.name, &e.name)?;
            let mut variants = Scope::new(format!("enum `{}`", e.name));
            for v in &e.variants {
                check_ident(backend, IdentKind::Variant, &v.value, &v.ident)?;
                variants.claim(&v.ident, &v.value)?;
                if backend.variants_in_package_scope() {
                    package.claim(&v.ident, &format!("{}.{}", e.name, v.value))?;
                }
            }
        }
        for s in &self.structs {
            check_ident(backend, IdentKind::Type, &s.name, &s.name)?;
            package.claim(&s.name, &s.name)?;
            let mut fields = Scope::new(format!("struct `{}`", s.name));
            for f in &s.fields {
                check_ident(backend, IdentKind::Field, &f.name, &f.ident)?;
                fields.claim(&f.ident, &f.name)?;
            }
        }
        for f in self.exports.iter().chain(&self.imports) {
            check_ident(backend, IdentKind::Function, &f.name, &f.ident)?;
            check_ident(backend, IdentKind::Function, &f.name, &f.wasm_ident)?;
            package.claim(&f.ident, &f.name)?;
            package.claim(&f.wasm_ident, &f.name)?;
        }
        Ok(())
    }
}

fn check_ident(
    backend: &dyn Backend,
    kind: IdentKind,
    name: &str,
    ident: &str,
) -> Result<(), GenerationError> {
    if backend.is_valid_ident(kind, ident) {
        return Ok(());
    }
    Err(GenerationError::InvalidIdentifier {
        kind,
        name: name.to_string(),
        ident: ident.to_string(),
    })
}

/// Identifiers declared in one namespace, keyed to the schema name that
/// produced them.
struct Scope {
    label: String,
    seen: HashMap<String, String>,
}

impl Scope {
    fn new(label: String) -> Self {
        Self {
            label,
            seen: HashMap::new(),
        }
    }

    fn claim(&mut self, ident: &str, name: &str) -> Result<(), GenerationError> {
        match self.seen.get(ident) {
            Some(first) => Err(GenerationError::DuplicateIdentifier {
                ident: ident.to_string(),
                first: first.clone(),
                second: name.to_string(),
                scope: self.label.clone(),
            }),
            None => {
                self.seen.insert(ident.to_string(), name.to_string());
                Ok(())
            }
        }
    }
}

fn checked(node: &Node, literal: String) -> Result<String, GenerationError> {
    if literal.trim().is_empty() {
        return Err(GenerationError::EmptyLiteral {
            node: node.name.clone(),
        });
    }
    Ok(literal)
}

fn enum_view(mapper: &dyn Backend, ty: &ResolvedType) -> EnumView {
    EnumView {
        name: ty.name.clone(),
        doc: represents(&ty.name, &ty.description),
        variants: ty
            .variants()
            .iter()
            .map(|v| VariantView {
                ident: mapper.variant_ident(&ty.name, v),
                value: v.clone(),
            })
            .collect(),
    }
}

fn struct_view(
    schema: &ResolvedSchema,
    mapper: &dyn Backend,
    ty: &ResolvedType,
) -> Result<StructView, GenerationError> {
    let fields = ty
        .fields()
        .iter()
        .map(|node| -> Result<FieldView, GenerationError> {
            Ok(FieldView {
                name: node.name.clone(),
                ident: mapper.field_ident(&node.name),
                doc: doc_lines(&node.description),
                type_expr: checked(node, mapper.type_expression(schema, node)?)?,
                is_required: node.is_required,
                default_value: checked(node, mapper.default_value(schema, node)?)?,
                zero_value: checked(node, mapper.zero_value(schema, node)?)?,
                sample_value: checked(node, mapper.sample_value(schema, node)?)?,
                zero_json: checked(node, mapper.json_literal(schema, node)?)?,
                sample_json: checked(node, mapper.sample_json_literal(schema, node)?)?,
                wire: checked(node, mapper.wire_schema_string(node))?,
                decoder: checked(node, mapper.decoder(node)?)?,
            })
        })
        .collect::<Result<_, _>>()?;
    Ok(StructView {
        name: ty.name.clone(),
        doc: represents(&ty.name, &ty.description),
        fields,
    })
}

fn payload_view(
    schema: &ResolvedSchema,
    mapper: &dyn Backend,
    node: &Node,
) -> Result<PayloadView, GenerationError> {
    let kind = match &node.ty {
        NodeType::Primitive(Primitive::String) => PayloadKind::Text,
        NodeType::Primitive(_) => PayloadKind::Json,
        NodeType::Struct { name, .. } | NodeType::Enum { name, .. } => PayloadKind::Reference {
            type_name: name.clone(),
        },
    };
    Ok(PayloadView {
        type_expr: checked(node, mapper.type_expression(schema, node)?)?,
        doc: doc_lines(&node.description),
        kind,
        default_value: checked(node, mapper.default_value(schema, node)?)?,
        decoder: checked(node, mapper.decoder(node)?)?,
    })
}

fn function_view(
    schema: &ResolvedSchema,
    mapper: &dyn Backend,
    f: &ResolvedFunction,
    wasm_ident: String,
) -> Result<FunctionView, GenerationError> {
    Ok(FunctionView {
        name: f.name.clone(),
        ident: mapper.function_ident(&f.name),
        wasm_ident,
        doc: doc_lines(&f.description),
        input: f
            .input
            .as_ref()
            .map(|n| payload_view(schema, mapper, n))
            .transpose()?,
        output: f
            .output
            .as_ref()
            .map(|n| payload_view(schema, mapper, n))
            .transpose()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{CustomType, Property, Schema, ValueType};
    use crate::registry::backend;
    use crate::resolve::resolve;

    fn build(types: Vec<CustomType>, target: &str) -> Result<ViewSet, GenerationError> {
        let mut schema = Schema::new("v1-draft");
        schema.custom_types = types;
        let resolved = resolve(&schema).unwrap();
        ViewSet::build(&resolved, backend(target).unwrap(), &GenerateOptions::default())
    }

    fn message(types: Vec<CustomType>, target: &str) -> String {
        match build(types, target) {
            Ok(_) => panic!("{target} should reject these types"),
            Err(err) => err.to_string(),
        }
    }

    #[test]
    fn variants_that_collapse_to_one_identifier() {
        let size = || CustomType::enumeration("Size", vec!["in-progress", "in_progress"]);
        assert_eq!(
            message(vec![size()], "go"),
            "`in-progress` and `in_progress` both map to `SizeEnumInProgress` in enum `Size`"
        );
        assert_eq!(
            message(vec![size()], "mbt"),
            "`in-progress` and `in_progress` both map to `InProgress` in enum `Size`"
        );
    }

    #[test]
    fn variants_that_are_not_identifiers() {
        let size = || CustomType::enumeration("Size", vec!["small", "1x"]);
        assert_eq!(
            message(vec![size()], "mbt"),
            "`1x` maps to `1x`, which is not a valid enum variant name"
        );
        let go = build(vec![size()], "go").unwrap();
        assert_eq!(go.enums[0].variants[1].ident, "SizeEnum1x");
    }

    #[test]
    fn go_constants_share_the_package_namespace() {
        let types = vec![
            CustomType::enumeration("A", vec!["enum-b"]),
            CustomType::enumeration("AEnum", vec!["b"]),
        ];
        assert_eq!(
            message(types.clone(), "go"),
            "`A.enum-b` and `AEnum.b` both map to `AEnumEnumB` in package `plugin`"
        );
        assert!(build(types, "mbt").is_ok());
    }

    #[test]
    fn fields_that_collapse_or_clash() {
        let record = |props: &[&str]| {
            let properties = props
                .iter()
                .map(|p| Property::new(*p, ValueType::primitive(Primitive::String)))
                .collect();
            CustomType::structure("Record", properties, vec![])
        };
        assert_eq!(
            message(vec![record(&["zipCode", "zip_code"])], "mbt"),
            "`zipCode` and `zip_code` both map to `zip_code` in struct `Record`"
        );
        assert_eq!(
            message(vec![record(&["type"])], "mbt"),
            "`type` maps to `type`, which is not a valid field name"
        );
        assert_eq!(
            message(vec![record(&["toJSON"])], "go"),
            "`toJSON` maps to `ToJSON`, which is not a valid field name"
        );
        let views = build(vec![record(&["fields", "title"])], "mbt").unwrap();
        let idents: Vec<_> = views.structs[0].fields.iter().map(|f| f.ident.as_str()).collect();
        assert_eq!(idents, ["fields", "title"]);
    }

    #[test]
    fn fields_carry_decoders() {
        let views = build(
            vec![CustomType::structure(
                "Point",
                vec![Property::new("x", ValueType::primitive(Primitive::Number))],
                vec!["x"],
            )],
            "mbt",
        )
        .unwrap();
        assert_eq!(views.structs[0].fields[0].decoder, "json_as_double");
    }
}
