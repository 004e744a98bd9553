//! Plugin stubs (`main.mbt`) and wasm entry points (`plugin-functions.mbt`).

use super::write_block;
use crate::output::view::{FunctionView, PayloadKind, ViewSet};
use std::fmt::{Result, Write};

pub(super) fn render_stubs(views: &ViewSet) -> std::result::Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(out, "// Implements the {} XTP extension plugin.\n", views.package)?;
    for f in &views.exports {
        write_stub(&mut out, f)?;
    }
    Ok(out)
}

fn write_stub(out: &mut String, f: &FunctionView) -> Result {
    let mut doc = f.doc.clone();
    if let Some(first) = doc.first_mut() {
        *first = format!("`{}` - {first}", f.ident);
    }
    let param_docs: Vec<String> = f
        .input
        .iter()
        .filter_map(|p| p.doc.first().map(|d| format!("`input` - {d}")))
        .chain(
            f.output
                .iter()
                .filter_map(|p| p.doc.first().map(|d| format!("Returns {d}"))),
        )
        .collect();
    if !param_docs.is_empty() {
        if !doc.is_empty() {
            doc.push(String::new());
        }
        doc.extend(param_docs);
    }
    write_block(out, &doc)?;

    let param = f
        .input
        .as_ref()
        .map(|p| format!("input : {}", p.type_expr))
        .unwrap_or_default();
    let ret = f.output.as_ref().map_or("Unit", |p| p.type_expr.as_str());
    writeln!(out, "pub fn {}({param}) -> {ret} {{", f.ident)?;
    if f.input.is_some() {
        out.push_str("  ignore(input)\n");
    }
    out.push_str("  // TODO: fill out your implementation here\n");
    match &f.output {
        Some(output) => writeln!(out, "  {}", output.default_value)?,
        None => out.push_str("  ()\n"),
    }
    out.push_str("}\n\n");
    Ok(())
}

pub(super) fn render_dispatch(views: &ViewSet) -> std::result::Result<String, std::fmt::Error> {
    let mut out = String::new();
    out.push_str("// Code generated by xtp2code. DO NOT EDIT.\n\n");

    let decodes_json = views
        .exports
        .iter()
        .any(|f| f.input.as_ref().is_some_and(|p| p.kind != PayloadKind::Text));
    if decodes_json {
        write_block(&mut out, &[])?;
        out.push_str("fn decode_input[T](decode : (Json) -> T?) -> T? {\n");
        out.push_str("  let json = @json.parse(@host.input_string()) catch { _ => return None }\n");
        out.push_str("  decode(json)\n}\n\n");
    }

    for f in &views.exports {
        write_entry_point(&mut out, f)?;
    }
    Ok(out)
}

fn write_entry_point(out: &mut String, f: &FunctionView) -> Result {
    let name = &f.name;
    write_block(out, &[format!("Exported as `{name}`.")])?;
    writeln!(out, "pub fn {}() -> Int {{", f.wasm_ident)?;

    match &f.input {
        None => {}
        Some(p) if p.kind == PayloadKind::Text => {
            out.push_str("  let input = @host.input_string()\n");
        }
        Some(p) => {
            writeln!(out, "  guard decode_input({}) is Some(input) else {{", p.decoder)?;
            writeln!(out, "    @host.log_error_str(\"{name}: unable to decode input\")")?;
            out.push_str("    return 1\n  }\n");
        }
    }

    let arg = if f.input.is_some() { "input" } else { "" };
    match &f.output {
        None => writeln!(out, "  {}({arg})", f.ident)?,
        Some(p) => {
            writeln!(out, "  let output = {}({arg})", f.ident)?;
            if p.kind == PayloadKind::Text {
                out.push_str("  @host.output_string(output)\n");
            } else {
                out.push_str("  @host.output_string(output.to_json().stringify())\n");
            }
        }
    }
    out.push_str("  0\n}\n\n");
    Ok(())
}
