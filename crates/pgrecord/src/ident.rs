//! SQL identifier quoting.
//!
//! Every identifier the compiler emits is double-quoted, with embedded `"`
//! escaped as `""`. Quoting unconditionally keeps logical-to-physical name
//! resolution independent of Postgres case folding.

/// Quote an identifier for inclusion in SQL text.
pub(crate) fn quote(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    quote_into(&mut out, name);
    out
}

/// Quote an identifier, appending to an existing buffer.
pub(crate) fn quote_into(out: &mut String, name: &str) {
    out.push('"');
    for ch in name.chars() {
        if ch == '"' {
            out.push('"');
            out.push('"');
        } else {
            out.push(ch);
        }
    }
    out.push('"');
}
