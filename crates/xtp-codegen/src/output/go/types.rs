//! Types and codecs (`<pkg>.go`).

use super::{GoBackend, receiver, write_doc, write_imports};
use crate::output::naming::quote;
use crate::output::view::{EnumView, StructView, ViewSet};
use std::fmt::{Result, Write};

pub(super) fn render(views: &ViewSet) -> std::result::Result<String, std::fmt::Error> {
    let mut out = String::new();
    out.push_str("// Code generated by xtp2code. DO NOT EDIT.\n\n");
    writeln!(out, "package {}\n", GoBackend::package(views))?;

    let has_types = !views.enums.is_empty() || !views.structs.is_empty();
    let needs_fmt = !views.enums.is_empty() || views.structs.iter().any(StructView::has_required);
    let mut imports = Vec::new();
    if has_types {
        imports.push("encoding/json");
    }
    if needs_fmt {
        imports.push("fmt");
    }
    write_imports(&mut out, &imports, &[])?;

    for e in &views.enums {
        write_enum(&mut out, e)?;
    }
    for s in &views.structs {
        write_struct(&mut out, s)?;
    }
    if !views.structs.is_empty() {
        out.push_str("// XTPSchema describes the values and types of an XTP object\n");
        out.push_str("// in a language-agnostic format.\n");
        out.push_str("type XTPSchema map[string]string\n");
    }
    Ok(out)
}

fn write_enum(out: &mut String, e: &EnumView) -> Result {
    let name = &e.name;
    let recv = receiver(name);
    write_doc(out, "", &e.doc)?;
    writeln!(out, "type {name} string\n")?;

    let width = e.variants.iter().map(|v| v.ident.len()).max().unwrap_or(0);
    out.push_str("const (\n");
    for v in &e.variants {
        writeln!(out, "\t{:<width$} {name} = {}", v.ident, quote(&v.value))?;
    }
    out.push_str(")\n\n");

    writeln!(out, "// Parse{name} parses a string and returns the value.")?;
    writeln!(out, "func Parse{name}(s string) (value {name}, err error) {{")?;
    out.push_str("\tswitch s {\n");
    for v in &e.variants {
        writeln!(out, "\tcase {}:", quote(&v.value))?;
        writeln!(out, "\t\treturn {}, nil", v.ident)?;
    }
    out.push_str("\tdefault:\n");
    writeln!(out, "\t\treturn value, fmt.Errorf(\"not a {name}: %v\", s)")?;
    out.push_str("\t}\n}\n\n");

    writeln!(out, "// String returns the canonical text of the value.")?;
    writeln!(out, "func ({recv} {name}) String() string {{")?;
    writeln!(out, "\treturn string({recv})")?;
    out.push_str("}\n\n");

    writeln!(out, "// UnmarshalJSON rejects strings that are not a {name}.")?;
    writeln!(out, "func ({recv} *{name}) UnmarshalJSON(data []byte) error {{")?;
    out.push_str("\tvar text string\n");
    out.push_str("\tif err := json.Unmarshal(data, &text); err != nil {\n\t\treturn err\n\t}\n");
    writeln!(out, "\tvalue, err := Parse{name}(text)")?;
    out.push_str("\tif err != nil {\n\t\treturn err\n\t}\n");
    writeln!(out, "\t*{recv} = value")?;
    out.push_str("\treturn nil\n}\n\n");
    Ok(())
}

fn write_struct(out: &mut String, s: &StructView) -> Result {
    let name = &s.name;
    let recv = receiver(name);
    write_doc(out, "", &s.doc)?;
    writeln!(out, "type {name} struct {{")?;
    for f in &s.fields {
        write_doc(out, "\t", &f.doc)?;
        let omit = if f.is_required { "" } else { ",omitempty" };
        writeln!(out, "\t{} {} `json:\"{}{omit}\"`", f.ident, f.type_expr, f.name)?;
    }
    out.push_str("}\n\n");

    writeln!(out, "// New{name} returns a {name} with default values.")?;
    writeln!(out, "func New{name}() {name} {{")?;
    writeln!(out, "\treturn {name}{{")?;
    for f in &s.fields {
        writeln!(out, "\t\t{}: {},", f.ident, f.default_value)?;
    }
    out.push_str("\t}\n}\n\n");

    writeln!(out, "// ToJSON returns the JSON encoding of the value.")?;
    writeln!(out, "func ({recv} {name}) ToJSON() (string, error) {{")?;
    writeln!(out, "\tbuf, err := json.Marshal({recv})")?;
    out.push_str("\tif err != nil {\n\t\treturn \"\", err\n\t}\n");
    out.push_str("\treturn string(buf), nil\n}\n\n");

    if s.has_required() {
        let keys: Vec<String> = s.required().map(|f| quote(&f.name)).collect();
        writeln!(out, "// UnmarshalJSON rejects objects missing a required field.")?;
        writeln!(out, "func ({recv} *{name}) UnmarshalJSON(data []byte) error {{")?;
        out.push_str("\tvar fields map[string]json.RawMessage\n");
        out.push_str(
            "\tif err := json.Unmarshal(data, &fields); err != nil {\n\t\treturn err\n\t}\n",
        );
        writeln!(out, "\tfor _, key := range []string{{{}}} {{", keys.join(", "))?;
        out.push_str("\t\tif _, ok := fields[key]; !ok {\n");
        writeln!(out, "\t\t\treturn fmt.Errorf(\"{name}: missing required field %q\", key)")?;
        out.push_str("\t\t}\n\t}\n");
        writeln!(out, "\ttype plain {name}")?;
        writeln!(out, "\treturn json.Unmarshal(data, (*plain)({recv}))")?;
        out.push_str("}\n\n");
    }

    writeln!(out, "// Parse{name} parses a JSON string and returns the value.")?;
    writeln!(out, "func Parse{name}(s string) (value {name}, err error) {{")?;
    out.push_str("\tif err := json.Unmarshal([]byte(s), &value); err != nil {\n");
    out.push_str("\t\treturn value, err\n\t}\n");
    out.push_str("\treturn value, nil\n}\n\n");

    let width = s.fields.iter().map(|f| f.name.len() + 3).max().unwrap_or(0);
    writeln!(out, "// GetSchema returns an `XTPSchema` for the `{name}`.")?;
    writeln!(out, "func ({recv} {name}) GetSchema() XTPSchema {{")?;
    out.push_str("\treturn XTPSchema{\n");
    for f in &s.fields {
        let key = format!("{}:", quote(&f.name));
        writeln!(out, "\t\t{key:<width$} {},", quote(&f.wire))?;
    }
    out.push_str("\t}\n}\n\n");
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::ir::{CustomType, Primitive, Property, Schema, ValueType};
    use crate::output::{GenerateOptions, Layout, generate};
    use crate::registry::backend;
    use crate::resolve::{ResolvedSchema, resolve};

    fn user_schema() -> ResolvedSchema {
        let mut schema = Schema::new("v1-draft");
        schema.custom_types = vec![
            CustomType::enumeration("Fruit", vec!["apple", "orange"]),
            CustomType::structure(
                "Address",
                vec![Property::new("street", ValueType::primitive(Primitive::String))],
                vec!["street"],
            ),
            CustomType::structure(
                "User",
                vec![
                    Property::new("age", ValueType::primitive(Primitive::Integer)),
                    Property::new("fruit", ValueType::reference("Fruit")),
                    Property::new("address", ValueType::reference("Address")),
                ],
                vec!["fruit"],
            ),
        ];
        resolve(&schema).unwrap()
    }

    fn render(file: &str) -> String {
        let options = GenerateOptions {
            package: "user".to_string(),
            layout: Layout::Types,
        };
        let artifacts = generate(&user_schema(), backend("go").unwrap(), &options).unwrap();
        artifacts[file].contents.clone()
    }

    #[test]
    fn types_and_codecs() {
        insta::assert_snapshot!(render("user.go"), @r###"
        // Code generated by xtp2code. DO NOT EDIT.

        package user

        import (
        	"encoding/json"
        	"fmt"
        )

        // Fruit represents a custom type.
        type Fruit string

        const (
        	FruitEnumApple  Fruit = "apple"
        	FruitEnumOrange Fruit = "orange"
        )

        // ParseFruit parses a string and returns the value.
        func ParseFruit(s string) (value Fruit, err error) {
        	switch s {
        	case "apple":
        		return FruitEnumApple, nil
        	case "orange":
        		return FruitEnumOrange, nil
        	default:
        		return value, fmt.Errorf("not a Fruit: %v", s)
        	}
        }

        // String returns the canonical text of the value.
        func (f Fruit) String() string {
        	return string(f)
        }

        // UnmarshalJSON rejects strings that are not a Fruit.
        func (f *Fruit) UnmarshalJSON(data []byte) error {
        	var text string
        	if err := json.Unmarshal(data, &text); err != nil {
        		return err
        	}
        	value, err := ParseFruit(text)
        	if err != nil {
        		return err
        	}
        	*f = value
        	return nil
        }

        // Address represents a custom type.
        type Address struct {
        	Street string `json:"street"`
        }

        // NewAddress returns a Address with default values.
        func NewAddress() Address {
        	return Address{
        		Street: "",
        	}
        }

        // ToJSON returns the JSON encoding of the value.
        func (a Address) ToJSON() (string, error) {
        	buf, err := json.Marshal(a)
        	if err != nil {
        		return "", err
        	}
        	return string(buf), nil
        }

        // UnmarshalJSON rejects objects missing a required field.
        func (a *Address) UnmarshalJSON(data []byte) error {
        	var fields map[string]json.RawMessage
        	if err := json.Unmarshal(data, &fields); err != nil {
        		return err
        	}
        	for _, key := range []string{"street"} {
        		if _, ok := fields[key]; !ok {
        			return fmt.Errorf("Address: missing required field %q", key)
        		}
        	}
        	type plain Address
        	return json.Unmarshal(data, (*plain)(a))
        }

        // ParseAddress parses a JSON string and returns the value.
        func ParseAddress(s string) (value Address, err error) {
        	if err := json.Unmarshal([]byte(s), &value); err != nil {
        		return value, err
        	}
        	return value, nil
        }

        // GetSchema returns an `XTPSchema` for the `Address`.
        func (a Address) GetSchema() XTPSchema {
        	return XTPSchema{
        		"street": "string",
        	}
        }

        // User represents a custom type.
        type User struct {
        	Age *int `json:"age,omitempty"`
        	Fruit Fruit `json:"fruit"`
        	Address *Address `json:"address,omitempty"`
        }

        // NewUser returns a User with default values.
        func NewUser() User {
        	return User{
        		Age: nil,
        		Fruit: FruitEnumApple,
        		Address: nil,
        	}
        }

        // ToJSON returns the JSON encoding of the value.
        func (u User) ToJSON() (string, error) {
        	buf, err := json.Marshal(u)
        	if err != nil {
        		return "", err
        	}
        	return string(buf), nil
        }

        // UnmarshalJSON rejects objects missing a required field.
        func (u *User) UnmarshalJSON(data []byte) error {
        	var fields map[string]json.RawMessage
        	if err := json.Unmarshal(data, &fields); err != nil {
        		return err
        	}
        	for _, key := range []string{"fruit"} {
        		if _, ok := fields[key]; !ok {
        			return fmt.Errorf("User: missing required field %q", key)
        		}
        	}
        	type plain User
        	return json.Unmarshal(data, (*plain)(u))
        }

        // ParseUser parses a JSON string and returns the value.
        func ParseUser(s string) (value User, err error) {
        	if err := json.Unmarshal([]byte(s), &value); err != nil {
        		return value, err
        	}
        	return value, nil
        }

        // GetSchema returns an `XTPSchema` for the `User`.
        func (u User) GetSchema() XTPSchema {
        	return XTPSchema{
        		"age":     "?integer",
        		"fruit":   "Fruit",
        		"address": "?Address",
        	}
        }

        // XTPSchema describes the values and types of an XTP object
        // in a language-agnostic format.
        type XTPSchema map[string]string
        "###);
    }
}
