//! Host function imports (`host-functions.mbt`).

use super::write_block;
use crate::output::view::{FunctionView, PayloadKind, ViewSet};
use std::fmt::{Result, Write};

pub(super) fn render(views: &ViewSet) -> std::result::Result<String, std::fmt::Error> {
    let mut out = String::new();
    out.push_str("// Code generated by xtp2code. DO NOT EDIT.\n\n");
    for f in &views.imports {
        write_host_call(&mut out, f)?;
    }
    Ok(out)
}

fn write_host_call(out: &mut String, f: &FunctionView) -> Result {
    let name = &f.name;
    let ident = &f.ident;
    let import = &f.wasm_ident;
    write_block(out, &[])?;
    writeln!(out, "fn {import}(offset : Int64) -> Int64 = \"extism:host/user\" \"{name}\"\n")?;

    let mut doc = f.doc.clone();
    if let Some(first) = doc.first_mut() {
        *first = format!("`{ident}` - {first}");
    }
    write_block(out, &doc)?;

    let param = f
        .input
        .as_ref()
        .map(|p| format!("input : {}", p.type_expr))
        .unwrap_or_default();
    let ret = f.output.as_ref().map_or("Unit", |p| p.type_expr.as_str());
    writeln!(out, "pub fn {ident}({param}) -> {ret} raise ParseError {{")?;

    let offset = match &f.input {
        None => "0L",
        Some(p) => {
            let text = if p.kind == PayloadKind::Text {
                "input"
            } else {
                "input.to_json().stringify()"
            };
            writeln!(out, "  let mem = @host.Memory::allocate_string({text})")?;
            "mem.offset"
        }
    };

    match &f.output {
        None => writeln!(out, "  ignore({import}({offset}))")?,
        Some(p) => {
            writeln!(out, "  let text = @host.find_memory({import}({offset})).to_string()")?;
            if p.kind == PayloadKind::Text {
                out.push_str("  text\n");
            } else {
                out.push_str("  let json = @json.parse(text) catch {\n");
                writeln!(out, "    e => raise ParseError(\"{name}: \\{{e}}\")")?;
                out.push_str("  }\n");
                writeln!(out, "  match {}(json) {{", p.decoder)?;
                out.push_str("    Some(value) => value\n");
                writeln!(
                    out,
                    "    None => raise ParseError(\"{name}: unexpected response \\{{text}}\")"
                )?;
                out.push_str("  }\n");
            }
        }
    }
    out.push_str("}\n\n");
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::ir::{CustomType, Import, Param, Primitive, Schema, ValueType};
    use crate::output::{GenerateOptions, generate};
    use crate::registry::backend;
    use crate::resolve::resolve;

    #[test]
    fn host_calls() {
        let mut schema = Schema::new("v1-draft");
        schema.custom_types = vec![CustomType::enumeration("Fruit", vec!["apple", "orange"])];
        schema.imports = vec![
            Import {
                name: "eatAFruit".to_string(),
                description: "Eats a fruit".to_string(),
                input: Some(Param::new(ValueType::reference("Fruit"))),
                output: Some(Param::new(ValueType::primitive(Primitive::Boolean))),
            },
            Import {
                name: "ping".to_string(),
                description: String::new(),
                input: None,
                output: None,
            },
        ];
        let resolved = resolve(&schema).unwrap();
        let mbt = backend("moonbit").unwrap();
        let artifacts = generate(&resolved, mbt, &GenerateOptions::default()).unwrap();
        let host = &artifacts["host-functions.mbt"].contents;
        assert!(host.contains(
            "fn host_eat_a_fruit(offset : Int64) -> Int64 = \"extism:host/user\" \"eatAFruit\"\n"
        ));
        assert!(host.contains(
            "/// `eat_a_fruit` - Eats a fruit\n\
             pub fn eat_a_fruit(input : Fruit) -> Bool raise ParseError {\n"
        ));
        assert!(host.contains(
            "  let mem = @host.Memory::allocate_string(input.to_json().stringify())\n"
        ));
        assert!(host.contains("  match json_as_bool(json) {\n"));
        assert!(host.contains(
            "pub fn ping() -> Unit raise ParseError {\n  ignore(host_ping(0L))\n}\n"
        ));
    }
}
