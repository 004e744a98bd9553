//! Host function imports (`host-functions.go`).

use super::{write_doc, write_imports};
use crate::output::view::{FunctionView, PayloadKind, ViewSet};
use std::fmt::{Result, Write};

pub(super) fn render(views: &ViewSet) -> std::result::Result<String, std::fmt::Error> {
    let mut out = String::new();
    out.push_str("// Code generated by xtp2code. DO NOT EDIT.\n\n");
    out.push_str("//go:build tinygo\n\n");
    out.push_str("package main\n\n");

    let uses_json = views.imports.iter().any(|f| {
        f.input.as_ref().is_some_and(|p| p.kind != PayloadKind::Text)
            || f.output.as_ref().is_some_and(|p| p.kind != PayloadKind::Text)
    });
    let stdlib: &[&str] = if uses_json { &["encoding/json"] } else { &[] };
    write_imports(&mut out, stdlib, &["github.com/extism/go-pdk"])?;

    for f in &views.imports {
        write_host_call(&mut out, f)?;
    }
    Ok(out)
}

fn write_host_call(out: &mut String, f: &FunctionView) -> Result {
    let name = &f.name;
    let ident = &f.ident;
    let import = &f.wasm_ident;
    writeln!(out, "//go:wasmimport extism:host/user {name}")?;
    writeln!(out, "func {import}(uint64) uint64\n")?;

    let mut doc = f.doc.clone();
    if let Some(first) = doc.first_mut() {
        *first = format!("{ident} - {first}");
    }
    write_doc(out, "", &doc)?;

    let param = f
        .input
        .as_ref()
        .map(|p| format!("input {}", p.type_expr))
        .unwrap_or_default();
    let results = match &f.output {
        Some(p) => format!("(result {}, err error)", p.type_expr),
        None => "(err error)".to_string(),
    };
    let fail = if f.output.is_some() { "result, err" } else { "err" };
    writeln!(out, "func {ident}({param}) {results} {{")?;

    match &f.input {
        None => out.push_str("\toffset := uint64(0)\n"),
        Some(p) if p.kind == PayloadKind::Text => {
            out.push_str("\tmem := pdk.AllocateString(input)\n");
            out.push_str("\toffset := mem.Offset()\n");
        }
        Some(_) => {
            out.push_str("\tbuf, err := json.Marshal(input)\n");
            writeln!(out, "\tif err != nil {{\n\t\treturn {fail}\n\t}}")?;
            out.push_str("\tmem := pdk.AllocateBytes(buf)\n");
            out.push_str("\toffset := mem.Offset()\n");
        }
    }

    match &f.output {
        None => {
            writeln!(out, "\t{import}(offset)")?;
            out.push_str("\treturn nil\n");
        }
        Some(p) => {
            writeln!(out, "\trmem := pdk.FindMemory({import}(offset))")?;
            if p.kind == PayloadKind::Text {
                out.push_str("\treturn string(rmem.ReadBytes()), nil\n");
            } else {
                writeln!(out, "\terr = {}(rmem.ReadBytes(), &result)", p.decoder)?;
                writeln!(out, "\treturn {fail}")?;
            }
        }
    }
    out.push_str("}\n\n");
    Ok(())
}
