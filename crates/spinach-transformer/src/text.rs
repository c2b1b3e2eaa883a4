//! Small string helpers shared by the generators.

/// Removes the common indentation of every line after the first.
///
/// The first line is where a node starts, so it never carries the indentation
/// of the surrounding code. Only the following lines are considered: those
/// with at least one leading space, plus the last line regardless (the line of
/// a closing brace decides how far a block can be shifted left).
pub fn dedent(code: &str) -> String {
    let mut lines = code.split('\n');
    let first = lines.next().unwrap_or_default();
    let rest: Vec<&str> = lines.collect();
    if rest.is_empty() {
        return code.to_string();
    }

    let last = rest.len() - 1;
    let base = rest
        .iter()
        .enumerate()
        .map(|(i, line)| (i, leading_spaces(line)))
        .filter(|&(i, spaces)| spaces > 0 || i == last)
        .map(|(_, spaces)| spaces)
        .min()
        .unwrap_or(0);
    if base == 0 {
        return code.to_string();
    }

    let mut out = String::with_capacity(code.len());
    out.push_str(first);
    for line in rest {
        out.push('\n');
        if leading_spaces(line) >= base {
            out.push_str(&line[base..]);
        } else {
            out.push_str(line);
        }
    }
    out
}

/// Indents every non-empty line after the first by `indentation` spaces.
pub fn indent(code: &str, indentation: usize) -> String {
    if indentation == 0 {
        return code.to_string();
    }
    let padding = " ".repeat(indentation);
    let mut out = String::with_capacity(code.len());
    for (i, line) in code.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
            if !line.is_empty() {
                out.push_str(&padding);
            }
        }
        out.push_str(line);
    }
    out
}

fn leading_spaces(line: &str) -> usize {
    line.bytes().take_while(|&b| b == b' ').count()
}

/// Renders `{\n  a,\n  b,\n}`, or `{}` without items.
pub fn multiline_object<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::from("{\n");
    let mut empty = true;
    for item in items {
        empty = false;
        out.push_str("  ");
        out.push_str(&indent(item.as_ref(), 2));
        out.push_str(",\n");
    }
    if empty {
        return "{}".to_string();
    }
    out.push('}');
    out
}

/// Converts `on-before-mount` or `v-click_outside` style names to camelCase.
///
/// Humps already inside a word are kept, so `on-beforeRouteUpdate` becomes
/// `onBeforeRouteUpdate`.
pub fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if matches!(c, '-' | '_' | ' ' | '.') {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else if out.is_empty() {
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

pub fn pascal_case(name: &str) -> String {
    let camel = camel_case(name);
    let mut chars = camel.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => camel,
    }
}

/// Whether `name` can be written as a bare JavaScript identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Quotes `value` as a single-quoted JavaScript string.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Renders an object key, quoting it when it is not an identifier.
pub fn property_key(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        quote(name)
    }
}

/// Renders `base.name`, or `base['name']` when `name` is not an identifier.
pub fn member_access(base: &str, name: &str) -> String {
    if is_identifier(name) {
        format!("{base}.{name}")
    } else {
        format!("{base}[{}]", quote(name))
    }
}
