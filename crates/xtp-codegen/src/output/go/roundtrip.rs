//! Round-trip tests (`<pkg>_test.go`).

use super::{GoBackend, json_string, write_imports};
use crate::output::naming::quote;
use crate::output::view::{EnumView, FieldView, StructView, ViewSet};
use std::fmt::{Result, Write};

pub(super) fn render(views: &ViewSet) -> std::result::Result<String, std::fmt::Error> {
    let mut out = String::new();
    out.push_str("// Code generated by xtp2code. DO NOT EDIT.\n\n");
    writeln!(out, "package {}\n", GoBackend::package(views))?;

    let mut imports = Vec::new();
    if !views.enums.is_empty() {
        imports.push("encoding/json");
    }
    if !views.structs.is_empty() {
        imports.push("reflect");
    }
    if !imports.is_empty() {
        imports.push("testing");
    }
    write_imports(&mut out, &imports, &[])?;

    let needs_ptr = views
        .structs
        .iter()
        .any(|s| s.fields.iter().any(|f| f.zero_value.starts_with("ptr(")));
    if needs_ptr {
        out.push_str("func ptr[T any](v T) *T { return &v }\n\n");
    }

    for e in &views.enums {
        write_enum_test(&mut out, e)?;
    }
    for s in &views.structs {
        write_fixture_test(
            &mut out,
            s,
            "RequiredFields",
            s.required(),
            |f| &f.zero_value,
            &s.required_json(),
        )?;
        if s.has_optional() {
            write_fixture_test(
                &mut out,
                s,
                "AllFields",
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
    let ident = &first.ident;
    writeln!(out, "func Test{name}RoundTrip(t *testing.T) {{")?;
    writeln!(out, "\tbuf, err := json.Marshal({ident})")?;
    out.push_str("\tif err != nil {\n\t\tt.Fatal(err)\n\t}\n");
    writeln!(
        out,
        "\tif got, want := string(buf), {}; got != want {{",
        json_string(&quote(&first.value))
    )?;
    out.push_str("\t\tt.Errorf(\"json.Marshal = %v, want %v\", got, want)\n\t}\n\n");

    writeln!(out, "\tvar parsed {name}")?;
    out.push_str("\tif err := json.Unmarshal(buf, &parsed); err != nil {\n\t\tt.Fatal(err)\n\t}\n");
    writeln!(out, "\tif parsed != {ident} {{")?;
    writeln!(out, "\t\tt.Errorf(\"json.Unmarshal = %v, want %v\", parsed, {ident})")?;
    out.push_str("\t}\n");
    writeln!(out, "\tif got := {ident}.String(); got != {} {{", quote(&first.value))?;
    writeln!(out, "\t\tt.Errorf(\"String() = %v, want %v\", got, {})", quote(&first.value))?;
    out.push_str("\t}\n\n");

    writeln!(out, "\tif _, err := Parse{name}(\"not-a-real-variant\"); err == nil {{")?;
    writeln!(out, "\t\tt.Error(\"Parse{name} accepted an unknown variant\")")?;
    out.push_str("\t}\n}\n\n");
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
    writeln!(out, "func Test{name}{fixture}(t *testing.T) {{")?;
    let fields: Vec<_> = fields.collect();
    if fields.is_empty() {
        writeln!(out, "\tvalue := {name}{{}}")?;
    } else {
        writeln!(out, "\tvalue := {name}{{")?;
        for f in fields {
            writeln!(out, "\t\t{}: {},", f.ident, value(f))?;
        }
        out.push_str("\t}\n");
    }
    writeln!(out, "\twant := {}\n", json_string(want))?;

    out.push_str("\tgot, err := value.ToJSON()\n");
    out.push_str("\tif err != nil {\n\t\tt.Fatal(err)\n\t}\n");
    out.push_str("\tif got != want {\n");
    out.push_str("\t\tt.Errorf(\"ToJSON =\\n%v\\nwant\\n%v\", got, want)\n\t}\n\n");

    writeln!(out, "\tparsed, err := Parse{name}(want)")?;
    out.push_str("\tif err != nil {\n\t\tt.Fatal(err)\n\t}\n");
    out.push_str("\tif !reflect.DeepEqual(parsed, value) {\n");
    writeln!(out, "\t\tt.Errorf(\"Parse{name} = %#v, want %#v\", parsed, value)")?;
    out.push_str("\t}\n");

    if fixture == "RequiredFields" && s.has_required() {
        writeln!(out, "\n\tif _, err := Parse{name}(`{{}}`); err == nil {{")?;
        writeln!(
            out,
            "\t\tt.Error(\"Parse{name} accepted an object without its required fields\")"
        )?;
        out.push_str("\t}\n");
    }
    out.push_str("}\n\n");
    Ok(())
}
