//! Types and codecs (`<pkg>.mbt`).

use super::{write_block, write_doc};
use crate::output::naming::quote;
use crate::output::view::{EnumView, StructView, ViewSet};
use std::fmt::{Result, Write};

/// Decoders for JSON primitives, shared by struct codecs and plugin glue.
const JSON_HELPERS: &str = "\
///|
fn json_as_int(json : Json) -> Int? {
  match json {
    Number(n, ..) if n.to_int().to_double() == n => Some(n.to_int())
    _ => None
  }
}

///|
fn json_as_double(json : Json) -> Double? {
  match json {
    Number(n, ..) => Some(n)
    _ => None
  }
}

///|
fn json_as_string(json : Json) -> String? {
  match json {
    String(s) => Some(s)
    _ => None
  }
}

///|
fn json_as_bool(json : Json) -> Bool? {
  match json {
    True => Some(true)
    False => Some(false)
    _ => None
  }
}

";

pub(super) fn render(views: &ViewSet) -> std::result::Result<String, std::fmt::Error> {
    let mut out = String::new();
    out.push_str("// Code generated by xtp2code. DO NOT EDIT.\n\n");
    write_block(
        &mut out,
        &["`ParseError` reports text that does not decode to the expected type.".to_string()],
    )?;
    out.push_str("pub(all) suberror ParseError String derive(Show)\n\n");
    out.push_str(JSON_HELPERS);

    for e in &views.enums {
        write_enum(&mut out, e)?;
    }
    for s in &views.structs {
        write_struct(&mut out, s)?;
    }
    if !views.structs.is_empty() {
        write_block(
            &mut out,
            &[
                "`XTPSchema` describes the values and types of an XTP object".to_string(),
                "in a language-agnostic format.".to_string(),
            ],
        )?;
        out.push_str("pub typealias XTPSchema = Map[String, String]\n");
    }
    Ok(out)
}

fn write_enum(out: &mut String, e: &EnumView) -> Result {
    let name = &e.name;
    write_block(out, &e.doc)?;
    writeln!(out, "pub(all) enum {name} {{")?;
    for v in &e.variants {
        writeln!(out, "  {}", v.ident)?;
    }
    out.push_str("} derive(Eq)\n\n");

    write_block(out, &[])?;
    writeln!(out, "pub impl Show for {name} with output(self, logger) {{")?;
    out.push_str("  logger.write_string(\n    match self {\n");
    for v in &e.variants {
        writeln!(out, "      {} => {}", v.ident, quote(&v.value))?;
    }
    out.push_str("    },\n  )\n}\n\n");

    write_block(out, &[])?;
    writeln!(out, "pub impl ToJson for {name} with to_json(self) {{")?;
    out.push_str("  Json::string(self.to_string())\n}\n\n");

    write_block(out, &[format!("`{name}::parse` parses the canonical text of a `{name}`.")])?;
    writeln!(out, "pub fn {name}::parse(s : String) -> {name} raise ParseError {{")?;
    out.push_str("  match s {\n");
    for v in &e.variants {
        writeln!(out, "    {} => {name}::{}", quote(&v.value), v.ident)?;
    }
    writeln!(out, "    _ => raise ParseError(\"not a {name}: \\{{s}}\")")?;
    out.push_str("  }\n}\n\n");

    write_block(
        out,
        &[format!("`{name}::from_json` decodes a JSON string, or returns `None`.")],
    )?;
    writeln!(out, "pub fn {name}::from_json(json : Json) -> {name}? {{")?;
    out.push_str("  match json {\n");
    for v in &e.variants {
        writeln!(out, "    String({}) => Some({name}::{})", quote(&v.value), v.ident)?;
    }
    out.push_str("    _ => None\n  }\n}\n\n");
    Ok(())
}

fn write_struct(out: &mut String, s: &StructView) -> Result {
    let name = &s.name;
    write_block(out, &s.doc)?;
    writeln!(out, "pub(all) struct {name} {{")?;
    for f in &s.fields {
        write_doc(out, "  ", &f.doc)?;
        writeln!(out, "  {} : {}", f.ident, f.type_expr)?;
    }
    out.push_str("} derive(Show, Eq)\n\n");

    write_block(out, &[format!("`{name}::new` returns a `{name}` with default values.")])?;
    writeln!(out, "pub fn {name}::new() -> {name} {{")?;
    if s.fields.is_empty() {
        out.push_str("  {  }\n}\n\n");
    } else {
        out.push_str("  {\n");
        for f in &s.fields {
            writeln!(out, "    {}: {},", f.ident, f.default_value)?;
        }
        out.push_str("  }\n}\n\n");
    }

    write_block(out, &[])?;
    writeln!(out, "pub impl ToJson for {name} with to_json(self) {{")?;
    out.push_str("  let __fields : Map[String, Json] = {}\n");
    for f in &s.fields {
        let key = quote(&f.name);
        if f.is_required {
            writeln!(out, "  __fields[{key}] = self.{}.to_json()", f.ident)?;
        } else {
            writeln!(out, "  if self.{} is Some(__value) {{", f.ident)?;
            writeln!(out, "    __fields[{key}] = __value.to_json()")?;
            out.push_str("  }\n");
        }
    }
    out.push_str("  Json::object(__fields)\n}\n\n");

    write_block(
        out,
        &[
            format!("`{name}::from_json` decodes a JSON object, or returns `None`"),
            "when a required field is missing or any present field is malformed.".to_string(),
        ],
    )?;
    writeln!(out, "pub fn {name}::from_json(json : Json) -> {name}? {{")?;
    let binding = if s.fields.is_empty() { "_" } else { "__fields" };
    writeln!(out, "  guard json is Object({binding}) else {{ return None }}")?;
    for f in &s.fields {
        let key = quote(&f.name);
        let decode = &f.decoder;
        let ident = &f.ident;
        if f.is_required {
            writeln!(
                out,
                "  guard __fields.get({key}).bind({decode}) is Some({ident}) \
                 else {{ return None }}"
            )?;
        } else {
            // absent or null is `None`; anything else must decode
            writeln!(out, "  let {ident} = match __fields.get({key}) {{")?;
            out.push_str("    None | Some(Null) => None\n");
            out.push_str("    Some(__json) => {\n");
            writeln!(out, "      guard {decode}(__json) is Some(__value) else {{ return None }}")?;
            out.push_str("      Some(__value)\n    }\n  }\n");
        }
    }
    let idents: Vec<&str> = s.fields.iter().map(|f| f.ident.as_str()).collect();
    writeln!(out, "  Some({{ {} }})", idents.join(", "))?;
    out.push_str("}\n\n");

    write_block(out, &[format!("`{name}::parse` parses a JSON string and returns the value.")])?;
    writeln!(out, "pub fn {name}::parse(s : String) -> {name} raise ParseError {{")?;
    out.push_str("  let json = @json.parse(s) catch {\n");
    writeln!(out, "    e => raise ParseError(\"unable to parse {name}: \\{{e}}\")")?;
    out.push_str("  }\n");
    writeln!(out, "  match {name}::from_json(json) {{")?;
    out.push_str("    Some(value) => value\n");
    writeln!(out, "    None => raise ParseError(\"not a {name}: \\{{s}}\")")?;
    out.push_str("  }\n}\n\n");

    write_block(out, &[format!("`{name}::get_schema` returns an `XTPSchema` for the `{name}`.")])?;
    writeln!(out, "pub fn {name}::get_schema(self : {name}) -> XTPSchema {{")?;
    out.push_str("  ignore(self)\n");
    if s.fields.is_empty() {
        out.push_str("  {}\n}\n\n");
        return Ok(());
    }
    out.push_str("  {\n");
    for f in &s.fields {
        writeln!(out, "    {}: {},", quote(&f.name), quote(&f.wire))?;
    }
    out.push_str("  }\n}\n\n");
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::ir::{CustomType, Primitive, Property, Schema, ValueType};
    use crate::output::{GenerateOptions, Layout, generate};
    use crate::registry::backend;
    use crate::resolve::resolve;

    fn render(schema: Schema) -> String {
        let resolved = resolve(&schema).unwrap();
        let options = GenerateOptions {
            package: "fruit".to_string(),
            layout: Layout::Types,
        };
        let artifacts = generate(&resolved, backend("mbt").unwrap(), &options).unwrap();
        artifacts["fruit.mbt"].contents.clone()
    }

    #[test]
    fn enum_codec() {
        let mut schema = Schema::new("v1-draft");
        schema.custom_types = vec![CustomType::enumeration("Fruit", vec!["apple", "orange"])];
        let out = render(schema);
        assert!(out.contains("pub(all) enum Fruit {\n  Apple\n  Orange\n} derive(Eq)\n"));
        assert!(out.contains("      Apple => \"apple\"\n"));
        assert!(out.contains("    \"orange\" => Fruit::Orange\n"));
        assert!(out.contains("    _ => raise ParseError(\"not a Fruit: \\{s}\")\n"));
        assert!(out.contains("    String(\"apple\") => Some(Fruit::Apple)\n"));
        assert!(!out.contains("XTPSchema"));
    }

    #[test]
    fn struct_codec() {
        let mut schema = Schema::new("v1-draft");
        schema.custom_types = vec![CustomType::structure(
            "Address",
            vec![
                Property::new("street", ValueType::primitive(Primitive::String)),
                Property::new("zipCode", ValueType::primitive(Primitive::Integer)),
            ],
            vec!["street"],
        )];
        let out = render(schema);
        assert!(out.contains("  street : String\n  zip_code : Int?\n} derive(Show, Eq)\n"));
        assert!(out.contains("    street: \"\",\n    zip_code: None,\n"));
        assert!(out.contains("  __fields[\"street\"] = self.street.to_json()\n"));
        assert!(out.contains(
            "  if self.zip_code is Some(__value) {\n    __fields[\"zipCode\"] = __value.to_json()\n"
        ));
        assert!(out.contains(
            "  guard __fields.get(\"street\").bind(json_as_string) is Some(street) \
             else { return None }\n"
        ));
        assert!(out.contains("  Some({ street, zip_code })\n"));
        assert!(out.contains("    \"zipCode\": \"?integer\",\n"));
        assert_eq!(out.matches("pub typealias XTPSchema").count(), 1);
    }

    #[test]
    fn present_optional_fields_must_decode() {
        let mut schema = Schema::new("v1-draft");
        schema.custom_types = vec![CustomType::structure(
            "Address",
            vec![Property::new("zip", ValueType::primitive(Primitive::Integer))],
            vec![],
        )];
        let out = render(schema);
        assert!(out.contains(
            "  let zip = match __fields.get(\"zip\") {
    None | Some(Null) => None
    Some(__json) => {
      guard json_as_int(__json) is Some(__value) else { return None }
      Some(__value)
    }
  }
"
        ));
        assert!(out.contains(
            "    Number(n, ..) if n.to_int().to_double() == n => Some(n.to_int())\n"
        ));
    }

    #[test]
    fn codec_locals_do_not_shadow_fields() {
        let mut schema = Schema::new("v1-draft");
        schema.custom_types = vec![CustomType::structure(
            "Page",
            vec![
                Property::new("fields", ValueType::primitive(Primitive::Integer)),
                Property::new("title", ValueType::primitive(Primitive::String)),
            ],
            vec!["fields", "title"],
        )];
        let out = render(schema);
        assert!(out.contains(
            "  guard __fields.get(\"fields\").bind(json_as_int) is Some(fields) \
             else { return None }\n  guard __fields.get(\"title\")"
        ));
        assert!(out.contains("  __fields[\"fields\"] = self.fields.to_json()\n"));
    }
}
