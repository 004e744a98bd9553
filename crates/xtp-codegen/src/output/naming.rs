//! Identifier and comment helpers shared by the renderers.

/// `aBoolean` -> `ABoolean`.
pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `GhostGang` -> `ghostGang`.
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `anOptionalDate` -> `an_optional_date`, `eatAFruit` -> `eat_a_fruit`.
pub fn lower_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c == '-' || c == ' ' {
            out.push('_');
            continue;
        }
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_lower) {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}

/// `not-a-real variant` -> `NotARealVariant`.
pub fn upper_camel(s: &str) -> String {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(upper_first)
        .collect()
}

/// ASCII identifier: a letter or `_`, then letters, digits or `_`.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Double-quoted string literal, valid in JSON, Go and MoonBit.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Non-empty lines of a description, trimmed at both ends.
pub fn doc_lines(description: &str) -> Vec<String> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.lines().map(|l| l.trim_end().to_string()).collect()
}

/// `Fruit` + `A set of fruits` -> `Fruit represents a set of fruits.`
pub fn represents(name: &str, description: &str) -> Vec<String> {
    let mut lines = doc_lines(description);
    match lines.first_mut() {
        Some(first) => *first = format!("{name} represents {}", lower_first(first)),
        None => return vec![format!("{name} represents a custom type.")],
    }
    if let Some(last) = lines.last_mut() {
        if !last.ends_with('.') {
            last.push('.');
        }
    }
    lines
}
