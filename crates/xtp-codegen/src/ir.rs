//! Schema model for XTP extension plugin definitions.
//!
//! The front end ([`crate::input`]) builds these types from schema YAML. The
//! model carries no behavior beyond construction validation and read-only
//! traversal; derived data (required-ness, resolved references) is computed
//! by [`crate::resolve`].

/// A complete extension plugin schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    /// Version marker as written in the source (e.g. `v0`, `v1-draft`).
    pub version: String,
    /// Functions the plugin offers to its host, in declaration order.
    pub exports: Vec<Export>,
    /// Functions the plugin may call on its host, in declaration order.
    pub imports: Vec<Import>,
    /// User-defined datatypes, in declaration order.
    pub custom_types: Vec<CustomType>,
}

/// A function exported by the plugin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Export {
    pub name: String,
    pub description: String,
    pub input: Option<Param>,
    pub output: Option<Param>,
    /// Documentation only, never read by code generation.
    pub code_samples: Vec<CodeSample>,
}

/// A host function imported by the plugin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Import {
    pub name: String,
    pub description: String,
    pub input: Option<Param>,
    pub output: Option<Param>,
}

/// Input or output payload of an export/import.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub ty: ValueType,
    pub description: String,
    pub content_type: Option<String>,
}

/// A code sample shown in documentation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeSample {
    pub lang: String,
    pub label: String,
    pub source: String,
}

/// A named user-defined datatype.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomType {
    pub name: String,
    pub description: String,
    pub content_type: Option<String>,
    pub kind: CustomTypeKind,
}

/// The shape of a custom type: exactly one of enum or struct.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomTypeKind {
    Enum(EnumDef),
    Struct(StructDef),
}

/// A closed set of string variants.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDef {
    /// Variants in declaration order. Never empty.
    pub variants: Vec<String>,
}

/// An object with named properties.
#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    /// Properties in declaration order. Never empty.
    pub properties: Vec<Property>,
    /// Names of the required properties.
    pub required: Vec<String>,
}

/// One field of a struct.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub description: String,
    pub ty: ValueType,
    /// Validation metadata only.
    pub minimum: Option<f64>,
    /// Validation metadata only.
    pub maximum: Option<f64>,
}

/// The type carried by a property or payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueType {
    /// A built-in kind with an optional refinement such as `date-time`.
    Primitive {
        kind: Primitive,
        format: Option<String>,
    },
    /// A reference to a custom type, kept verbatim (`#/schemas/Fruit`).
    Ref(String),
}

/// Built-in value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Integer,
    String,
    Number,
    Boolean,
    Object,
    Array,
    Buffer,
}

impl Primitive {
    /// Schema spelling of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Primitive::Integer => "integer",
            Primitive::String => "string",
            Primitive::Number => "number",
            Primitive::Boolean => "boolean",
            Primitive::Object => "object",
            Primitive::Array => "array",
            Primitive::Buffer => "buffer",
        }
    }

    /// Parse the schema spelling of a kind.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "integer" => Primitive::Integer,
            "string" => Primitive::String,
            "number" => Primitive::Number,
            "boolean" => Primitive::Boolean,
            "object" => Primitive::Object,
            "array" => Primitive::Array,
            "buffer" => Primitive::Buffer,
            _ => return None,
        })
    }

    /// Whether every target has a complete mapping for this kind.
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            Primitive::Integer | Primitive::String | Primitive::Number | Primitive::Boolean
        )
    }
}

impl std::fmt::Display for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ValueType {
    pub fn primitive(kind: Primitive) -> Self {
        ValueType::Primitive { kind, format: None }
    }

    pub fn reference(name: &str) -> Self {
        ValueType::Ref(format!("#/schemas/{name}"))
    }

    /// Name of the referenced custom type: the last `/` segment of the ref.
    pub fn ref_name(&self) -> Option<&str> {
        match self {
            ValueType::Ref(r) => r.rsplit('/').next(),
            ValueType::Primitive { .. } => None,
        }
    }
}

impl Schema {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Self::default()
        }
    }

    /// Whether this schema uses the legacy (v0) grammar.
    pub fn is_legacy(&self) -> bool {
        self.version == "v0"
    }

    pub fn exports(&self) -> &[Export] {
        &self.exports
    }

    pub fn imports(&self) -> &[Import] {
        &self.imports
    }

    pub fn custom_types(&self) -> &[CustomType] {
        &self.custom_types
    }

    /// First custom type declared with `name`.
    pub fn custom_type(&self, name: &str) -> Option<&CustomType> {
        self.custom_types.iter().find(|ct| ct.name == name)
    }
}

impl CustomType {
    pub fn enumeration(name: impl Into<String>, variants: Vec<&str>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            content_type: None,
            kind: CustomTypeKind::Enum(EnumDef {
                variants: variants.into_iter().map(String::from).collect(),
            }),
        }
    }

    pub fn structure(
        name: impl Into<String>,
        properties: Vec<Property>,
        required: Vec<&str>,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            content_type: None,
            kind: CustomTypeKind::Struct(StructDef {
                properties,
                required: required.into_iter().map(String::from).collect(),
            }),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl Property {
    pub fn new(name: impl Into<String>, ty: ValueType) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            ty,
            minimum: None,
            maximum: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl Param {
    pub fn new(ty: ValueType) -> Self {
        Self {
            ty,
            description: String::new(),
            content_type: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
