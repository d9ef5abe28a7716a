//! Substitution into the printf-style HTML output template.
//!
//! The template holds exactly one `%s` for the rendered body. `%%` renders as
//! a literal `%`; any other `%` sequence is copied through unchanged.

use crate::error::ConfigError;

const PLACEHOLDER: &str = "%s";

/// Count `%s` placeholders, skipping `%%` escapes.
pub fn count_placeholders(template: &str) -> usize {
    let mut count = 0;
    let mut chars = template.chars();
    while let Some(ch) = chars.next() {
        if ch != '%' {
            continue;
        }
        match chars.next() {
            Some('s') => count += 1,
            Some(_) | None => {}
        }
    }
    count
}

/// Replace the single `%s` in `template` with `body`.
pub fn fill_template(template: &str, body: &str) -> Result<String, ConfigError> {
    let found = count_placeholders(template);
    if found != 1 {
        return Err(ConfigError::Template(format!(
            "expected exactly one {PLACEHOLDER} placeholder, found {found}"
        )));
    }

    let mut out = String::with_capacity(template.len() + body.len());
    let mut chars = template.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }
        match chars.peek() {
            Some('s') => {
                chars.next();
                out.push_str(body);
            }
            Some('%') => {
                chars.next();
                out.push('%');
            }
            _ => out.push('%'),
        }
    }
    Ok(out)
}
