//! MySQL identifier and literal escaping.
//!
//! Every table name, column name and value that ends up in generated SQL goes
//! through this module.
//!
//! - Identifiers are wrapped in backticks, embedded backticks are doubled and
//!   dots separate qualified parts (`db.users` → `` `db`.`users` ``).
//! - Literals are rendered with MySQL backslash escapes inside single quotes.

use crate::value::Value;
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt::Write;

/// Quote an identifier (table or column name).
///
/// # Example
/// ```ignore
/// assert_eq!(zeal::escape_id("db.users"), "`db`.`users`");
/// ```
pub fn escape_id(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    write_id(&mut out, name);
    out
}

pub(crate) fn write_id(out: &mut String, name: &str) {
    for (i, part) in name.split('.').enumerate() {
        if i > 0 {
            out.push('.');
        }
        out.push('`');
        for ch in part.chars() {
            if ch == '`' {
                out.push_str("``");
            } else {
                out.push(ch);
            }
        }
        out.push('`');
    }
}

/// Render a value as a SQL literal.
pub fn escape(value: &Value) -> String {
    let mut out = String::new();
    write_literal(&mut out, value);
    out
}

/// Render a list of values as a parenthesized, comma-joined literal list: `(1,'a',NULL)`.
pub fn escape_list(values: &[Value]) -> String {
    let mut out = String::with_capacity(values.len() * 4 + 2);
    write_list(&mut out, values);
    out
}

pub(crate) fn write_list(out: &mut String, values: &[Value]) {
    out.push('(');
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_literal(out, value);
    }
    out.push(')');
}

/// Whether `value` is written as the `NULL` literal.
pub(crate) fn is_null_literal(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Float(f) => !f.is_finite(),
        _ => false,
    }
}

pub(crate) fn write_literal(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("NULL"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Int(i) => {
            let _ = write!(out, "{i}");
        }
        Value::UInt(u) => {
            let _ = write!(out, "{u}");
        }
        Value::Float(f) if f.is_finite() => {
            let _ = write!(out, "{f}");
        }
        Value::Float(_) => out.push_str("NULL"),
        Value::Text(s) => write_string(out, s),
        Value::Bytes(bytes) => {
            out.push_str("X'");
            for b in bytes {
                let _ = write!(out, "{b:02x}");
            }
            out.push('\'');
        }
        Value::Date(d) => write_date(out, d),
        Value::DateTime(dt) => write_datetime(out, dt),
        Value::Json(json) => write_string(out, &json.to_string()),
    }
}

fn write_string(out: &mut String, s: &str) {
    out.reserve(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\0' => out.push_str("\\0"),
            '\x08' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x1a' => out.push_str("\\Z"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out.push('\'');
}

fn write_date(out: &mut String, d: &NaiveDate) {
    let _ = write!(out, "'{}'", d.format("%Y-%m-%d"));
}

fn write_datetime(out: &mut String, dt: &NaiveDateTime) {
    let _ = write!(out, "'{}'", dt.format("%Y-%m-%d %H:%M:%S%.3f"));
}
