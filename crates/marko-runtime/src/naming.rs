//! Debug display-name synthesis.
//!
//! Derives a human-readable class name from a component type string for
//! diagnostics: strip the well-known path/file suffixes, take the last path
//! segment, camel-case dashes, drop a trailing version marker, and force a
//! valid identifier. A type string with no path segment gets the generic
//! anonymous name. Returns `None` instead of failing — naming never blocks
//! class resolution.

const ANONYMOUS: &str = "AnonymousComponent";

pub(crate) fn display_name_for(type_name: &str) -> Option<String> {
    let mut rest = type_name;
    for suffix in [".marko", ".component-browser", ".component"] {
        if let Some(stripped) = rest.strip_suffix(suffix) {
            rest = stripped;
            break;
        }
    }
    for suffix in ["/index", "/template"] {
        if let Some(stripped) = rest.strip_suffix(suffix) {
            rest = stripped;
            break;
        }
    }

    let segment = match rest.rfind('/') {
        Some(i) if i + 1 < rest.len() => &rest[i + 1..],
        _ => ANONYMOUS,
    };

    let name = camel_case_dashes(segment);
    let name = strip_version_suffix(&name);
    let name = force_identifier(name);
    let name = uppercase_first(&name);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn camel_case_dashes(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut upper_next = false;
    for c in segment.chars() {
        if c == '-' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Drop a trailing `$<major>.<minor>.<patch>` package-version marker.
fn strip_version_suffix(name: &str) -> String {
    if let Some(i) = name.rfind('$') {
        let version = &name[i + 1..];
        let parts: Vec<&str> = version.split('.').collect();
        if parts.len() == 3 && parts.iter().all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit())) {
            return name[..i].to_string();
        }
    }
    name.to_string()
}

fn force_identifier(name: String) -> String {
    let mut out = String::with_capacity(name.len() + 1);
    if name
        .chars()
        .next()
        .is_some_and(|c| !(c.is_ascii_alphabetic() || c == '$' || c == '_'))
    {
        out.push('_');
    }
    let mut last_was_replacement = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '$' || c == '_' {
            out.push(c);
            last_was_replacement = false;
        } else if !last_was_replacement {
            out.push('_');
            last_was_replacement = true;
        }
    }
    out
}

fn uppercase_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
