//! Named placeholder substitution for raw SQL.
//!
//! `:name` tokens whose name is present in the supplied [`Conditions`] are
//! replaced by the escaped value; every other token is left as written.

use crate::condition::Conditions;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::OnceLock;

fn placeholder_re() -> &'static Regex {
    static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER_RE.get_or_init(|| {
        Regex::new(r":([A-Za-z0-9_]+)").expect("invalid built-in placeholder regex")
    })
}

/// Substitute `:name` tokens in `sql` with escaped values from `values`.
///
/// # Example
/// ```ignore
/// let values = Conditions::new().set("id", 5);
/// assert_eq!(
///     format_named("SELECT * FROM t WHERE id = :id AND x = :x", &values),
///     "SELECT * FROM t WHERE id = 5 AND x = :x",
/// );
/// ```
pub fn format_named<'a>(sql: &'a str, values: &Conditions) -> Cow<'a, str> {
    if values.is_empty() {
        return Cow::Borrowed(sql);
    }

    placeholder_re().replace_all(sql, |caps: &Captures<'_>| match values.get(&caps[1]) {
        Some(condition) => {
            let mut out = String::new();
            condition.write_value(&mut out);
            out
        }
        None => caps[0].to_string(),
    })
}
