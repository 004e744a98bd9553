//! Round-trip tests (`<pkg>_test.mbt`).

use super::write_block;
use crate::output::naming::quote;
use crate::output::view::{EnumView, FieldView, StructView, ViewSet};
use std::fmt::{Result, Write};

pub(super) fn render(views: &ViewSet) -> std::result::Result<String, std::fmt::Error> {
    let mut out = String::new();
    out.push_str("// Code generated by xtp2code. DO NOT EDIT.\n\n");
    for e in &views.enums {
        write_enum_test(&mut out, e)?;
    }
    for s in &views.structs {
        write_fixture_test(
            &mut out,
            s,
            "required fields",
            s.required(),
            |f| &f.zero_value,
            &s.required_json(),
        )?;
        if s.has_optional() {
            write_fixture_test(
                &mut out,
                s,
                "all fields",
                s.fields.iter(),
                |f| &f.sample_value,
                &s.full_json(),
            )?;
        }
    }
    Ok(out)
}

fn write_enum_test(out: &mut String, e: &EnumView) -> Result {
    let name = &e.name;
    let Some(first) = e.variants.first() else {
        return Ok(());
    };
    write_block(out, &[])?;
    writeln!(out, "test \"{name} round trip\" {{")?;
    writeln!(out, "  let value = {name}::{}", first.ident)?;
    writeln!(out, "  assert_eq(value.to_string(), {})", quote(&first.value))?;
    writeln!(out, "  assert_eq({name}::parse({}), value)", quote(&first.value))?;
    writeln!(out, "  assert_eq(value.to_json().stringify(), {})", quote(&quote(&first.value)))?;
    writeln!(out, "  assert_eq({name}::from_json(value.to_json()), Some(value))")?;
    writeln!(out, "  assert_true((try? {name}::parse(\"not-a-real-variant\")) is Err(_))")?;
    out.push_str("}\n\n");
    Ok(())
}

fn write_fixture_test<'a>(
    out: &mut String,
    s: &StructView,
    fixture: &str,
    fields: impl Iterator<Item = &'a FieldView>,
    value: impl Fn(&FieldView) -> &String,
    want: &str,
) -> Result {
    let name = &s.name;
    write_block(out, &[])?;
    writeln!(out, "test \"{name} {fixture}\" {{")?;
    let fields: Vec<_> = fields.collect();
    if fields.is_empty() {
        writeln!(out, "  let value = {name}::new()")?;
    } else {
        writeln!(out, "  let value : {name} = {{")?;
        writeln!(out, "    ..{name}::new(),")?;
        for f in fields {
            writeln!(out, "    {}: {},", f.ident, value(f))?;
        }
        out.push_str("  }\n");
    }
    out.push_str("  let want =\n");
    writeln!(out, "    #|{want}")?;
    out.push_str("  assert_eq(value.to_json().stringify(), want)\n");
    writeln!(out, "  assert_eq({name}::parse(want), value)")?;
    if fixture == "required fields" && s.has_required() {
        writeln!(out, "  assert_true((try? {name}::parse(\"{{}}\")) is Err(_))")?;
    }
    out.push_str("}\n\n");
    Ok(())
}
