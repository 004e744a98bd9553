//! Plugin stubs (`main.go`) and wasm entry points (`plugin-functions.go`).

use super::{write_doc, write_imports};
use crate::output::view::{FunctionView, PayloadKind, ViewSet};
use std::fmt::{Result, Write};

const PDK: &str = "github.com/extism/go-pdk";

pub(super) fn render_stubs(views: &ViewSet) -> std::result::Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(out, "// Package main implements the {} XTP extension plugin.", views.package)?;
    out.push_str("package main\n\n");
    for f in &views.exports {
        write_stub(&mut out, f)?;
    }
    out.push_str("func main() {}\n");
    Ok(out)
}

fn write_stub(out: &mut String, f: &FunctionView) -> Result {
    let mut doc = f.doc.clone();
    if let Some(first) = doc.first_mut() {
        *first = format!("{} - {first}", f.ident);
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
    write_doc(out, "", &doc)?;

    let param = f
        .input
        .as_ref()
        .map(|p| format!("input {}", p.type_expr))
        .unwrap_or_default();
    let ret = f
        .output
        .as_ref()
        .map(|p| format!(" {}", p.type_expr))
        .unwrap_or_default();
    writeln!(out, "func {}({param}){ret} {{", f.ident)?;
    out.push_str("\t// TODO: fill out your implementation here\n");
    if let Some(output) = &f.output {
        writeln!(out, "\treturn {}", output.default_value)?;
    }
    out.push_str("}\n\n");
    Ok(())
}

pub(super) fn render_dispatch(views: &ViewSet) -> std::result::Result<String, std::fmt::Error> {
    let mut out = String::new();
    out.push_str("// Code generated by xtp2code. DO NOT EDIT.\n\n");
    out.push_str("//go:build tinygo\n\n");
    out.push_str("package main\n\n");

    let uses_json = views.exports.iter().any(|f| {
        f.input.as_ref().is_some_and(|p| p.kind != PayloadKind::Text)
            || f.output.as_ref().is_some_and(|p| p.kind != PayloadKind::Text)
    });
    let uses_pdk = views
        .exports
        .iter()
        .any(|f| f.input.is_some() || f.output.is_some());
    let stdlib: &[&str] = if uses_json { &["encoding/json", "fmt"] } else { &[] };
    let external: &[&str] = if uses_pdk { &[PDK] } else { &[] };
    write_imports(&mut out, stdlib, external)?;

    for f in &views.exports {
        write_entry_point(&mut out, f)?;
    }
    Ok(out)
}

fn write_entry_point(out: &mut String, f: &FunctionView) -> Result {
    let name = &f.name;
    writeln!(out, "//export {name}")?;
    writeln!(out, "func {}() int32 {{", f.wasm_ident)?;

    match &f.input {
        None => {}
        Some(p) if p.kind == PayloadKind::Text => {
            out.push_str("\tinput := pdk.InputString()\n");
        }
        Some(p) => {
            writeln!(out, "\tvar input {}", p.type_expr)?;
            writeln!(out, "\tif err := {}(pdk.Input(), &input); err != nil {{", p.decoder)?;
            writeln!(
                out,
                "\t\tpdk.Log(pdk.LogError, fmt.Sprintf(\"{name}: unable to decode input: %v\", \
                 err))"
            )?;
            out.push_str("\t\treturn 1\n\t}\n");
        }
    }

    let arg = if f.input.is_some() { "input" } else { "" };
    match &f.output {
        None => writeln!(out, "\t{}({arg})", f.ident)?,
        Some(p) if p.kind == PayloadKind::Text => {
            writeln!(out, "\toutput := {}({arg})", f.ident)?;
            out.push_str("\tpdk.OutputString(output)\n");
        }
        Some(_) => {
            writeln!(out, "\toutput := {}({arg})", f.ident)?;
            out.push_str("\tbuf, err := json.Marshal(output)\n");
            out.push_str("\tif err != nil {\n");
            writeln!(
                out,
                "\t\tpdk.Log(pdk.LogError, fmt.Sprintf(\"{name}: unable to encode output: %v\", \
                 err))"
            )?;
            out.push_str("\t\treturn 1\n\t}\n");
            out.push_str("\tpdk.Output(buf)\n");
        }
    }
    out.push_str("\treturn 0\n}\n\n");
    Ok(())
}
