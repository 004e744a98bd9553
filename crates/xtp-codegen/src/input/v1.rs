//! Current grammar (`version: v1-draft`).
//!
//! YAML is read into raw mirror structs first; converting those into the
//! model is where shape errors (enum and properties both set, property with
//! both `type` and `$ref`) are reported.

use super::ParseError;
use crate::ir::{
    CodeSample, CustomType, CustomTypeKind, EnumDef, Export, Import, Param, Primitive, Property,
    Schema, StructDef, ValueType,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct RawSchema {
    version: String,
    #[serde(default)]
    exports: Vec<RawExport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    imports: Vec<RawImport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    schemas: Vec<RawCustomType>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawExport {
    name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    input: Option<RawParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output: Option<RawParam>,
    #[serde(rename = "codeSamples", default, skip_serializing_if = "Vec::is_empty")]
    code_samples: Vec<RawCodeSample>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawImport {
    name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    input: Option<RawParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output: Option<RawParam>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawParam {
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    reference: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    ty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(rename = "contentType", default, skip_serializing_if = "Option::is_none")]
    content_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawCodeSample {
    lang: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    label: String,
    #[serde(default)]
    source: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawCustomType {
    name: String,
    #[serde(rename = "contentType", default, skip_serializing_if = "Option::is_none")]
    content_type: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    variants: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    required: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    properties: Vec<RawProperty>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawProperty {
    name: String,
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    reference: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    ty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    maximum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    minimum: Option<f64>,
}

pub(super) fn parse(text: &str) -> Result<Schema, ParseError> {
    let raw: RawSchema = serde_yaml::from_str(text)?;
    raw.into_schema()
}

impl RawSchema {
    fn into_schema(self) -> Result<Schema, ParseError> {
        let exports = self
            .exports
            .into_iter()
            .map(RawExport::into_export)
            .collect::<Result<_, _>>()?;
        let imports = self
            .imports
            .into_iter()
            .map(RawImport::into_import)
            .collect::<Result<_, _>>()?;
        let custom_types = self
            .schemas
            .into_iter()
            .map(RawCustomType::into_custom_type)
            .collect::<Result<_, _>>()?;
        Ok(Schema {
            version: self.version,
            exports,
            imports,
            custom_types,
        })
    }
}

impl RawExport {
    fn into_export(self) -> Result<Export, ParseError> {
        let input = param(&self.name, "input", self.input)?;
        let output = param(&self.name, "output", self.output)?;
        Ok(Export {
            name: self.name,
            description: self.description,
            input,
            output,
            code_samples: self
                .code_samples
                .into_iter()
                .map(|s| CodeSample {
                    lang: s.lang,
                    label: s.label,
                    source: s.source,
                })
                .collect(),
        })
    }
}

impl RawImport {
    fn into_import(self) -> Result<Import, ParseError> {
        let input = param(&self.name, "input", self.input)?;
        let output = param(&self.name, "output", self.output)?;
        Ok(Import {
            name: self.name,
            description: self.description,
            input,
            output,
        })
    }
}

impl RawCustomType {
    fn into_custom_type(self) -> Result<CustomType, ParseError> {
        let kind = match (self.variants.is_empty(), self.properties.is_empty()) {
            (false, true) => {
                if !self.required.is_empty() {
                    return Err(ParseError::InvalidCustomType {
                        name: self.name,
                        reason: "enum types cannot list required properties".into(),
                    });
                }
                CustomTypeKind::Enum(EnumDef {
                    variants: self.variants,
                })
            }
            (true, false) => {
                let properties = self
                    .properties
                    .into_iter()
                    .map(|p| p.into_property(&self.name))
                    .collect::<Result<_, _>>()?;
                CustomTypeKind::Struct(StructDef {
                    properties,
                    required: self.required,
                })
            }
            (false, false) => {
                return Err(ParseError::InvalidCustomType {
                    name: self.name,
                    reason: "has both `enum` and `properties`".into(),
                });
            }
            (true, true) => {
                return Err(ParseError::InvalidCustomType {
                    name: self.name,
                    reason: "needs either `enum` or `properties`".into(),
                });
            }
        };
        Ok(CustomType {
            name: self.name,
            description: self.description,
            content_type: self.content_type,
            kind,
        })
    }
}

impl RawProperty {
    fn into_property(self, owner: &str) -> Result<Property, ParseError> {
        let location = format!("{owner}.{}", self.name);
        let ty = value_type(&location, self.reference, self.ty, self.format)?;
        Ok(Property {
            name: self.name,
            description: self.description,
            ty,
            minimum: self.minimum,
            maximum: self.maximum,
        })
    }
}

fn param(function: &str, slot: &str, raw: Option<RawParam>) -> Result<Option<Param>, ParseError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let location = format!("{function} {slot}");
    Ok(Some(Param {
        ty: value_type(&location, raw.reference, raw.ty, raw.format)?,
        description: raw.description,
        content_type: raw.content_type,
    }))
}

fn value_type(
    location: &str,
    reference: Option<String>,
    ty: Option<String>,
    format: Option<String>,
) -> Result<ValueType, ParseError> {
    let reference = reference.filter(|r| !r.is_empty());
    let ty = ty.filter(|t| !t.is_empty());
    match (reference, ty) {
        (Some(r), None) => Ok(ValueType::Ref(r)),
        (None, Some(t)) => {
            let kind = Primitive::from_name(&t).ok_or(ParseError::UnknownPrimitive(t))?;
            Ok(ValueType::Primitive {
                kind,
                format: format.filter(|f| !f.is_empty()),
            })
        }
        (Some(_), Some(_)) => Err(ParseError::InvalidProperty {
            name: location.to_string(),
            reason: "has both `type` and `$ref`".into(),
        }),
        (None, None) => Err(ParseError::InvalidProperty {
            name: location.to_string(),
            reason: "needs either `type` or `$ref`".into(),
        }),
    }
}

impl From<&Schema> for RawSchema {
    fn from(schema: &Schema) -> Self {
        RawSchema {
            version: schema.version.clone(),
            exports: schema
                .exports
                .iter()
                .map(|e| RawExport {
                    name: e.name.clone(),
                    description: e.description.clone(),
                    input: e.input.as_ref().map(RawParam::from),
                    output: e.output.as_ref().map(RawParam::from),
                    code_samples: e
                        .code_samples
                        .iter()
                        .map(|s| RawCodeSample {
                            lang: s.lang.clone(),
                            label: s.label.clone(),
                            source: s.source.clone(),
                        })
                        .collect(),
                })
                .collect(),
            imports: schema
                .imports
                .iter()
                .map(|i| RawImport {
                    name: i.name.clone(),
                    description: i.description.clone(),
                    input: i.input.as_ref().map(RawParam::from),
                    output: i.output.as_ref().map(RawParam::from),
                })
                .collect(),
            schemas: schema.custom_types.iter().map(RawCustomType::from).collect(),
        }
    }
}

fn split_value_type(ty: &ValueType) -> (Option<String>, Option<String>, Option<String>) {
    match ty {
        ValueType::Ref(r) => (Some(r.clone()), None, None),
        ValueType::Primitive { kind, format } => {
            (None, Some(kind.as_str().to_string()), format.clone())
        }
    }
}

impl From<&Param> for RawParam {
    fn from(param: &Param) -> Self {
        let (reference, ty, format) = split_value_type(&param.ty);
        RawParam {
            reference,
            ty,
            format,
            description: param.description.clone(),
            content_type: param.content_type.clone(),
        }
    }
}

impl From<&CustomType> for RawCustomType {
    fn from(ct: &CustomType) -> Self {
        let (variants, required, properties) = match &ct.kind {
            CustomTypeKind::Enum(e) => (e.variants.clone(), Vec::new(), Vec::new()),
            CustomTypeKind::Struct(s) => (
                Vec::new(),
                s.required.clone(),
                s.properties
                    .iter()
                    .map(|p| {
                        let (reference, ty, format) = split_value_type(&p.ty);
                        RawProperty {
                            name: p.name.clone(),
                            reference,
                            ty,
                            format,
                            description: p.description.clone(),
                            maximum: p.maximum,
                            minimum: p.minimum,
                        }
                    })
                    .collect(),
            ),
        };
        RawCustomType {
            name: ct.name.clone(),
            content_type: ct.content_type.clone(),
            description: ct.description.clone(),
            variants,
            required,
            properties,
        }
    }
}
