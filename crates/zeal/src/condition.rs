//! Filter conditions for structured queries and named values for raw queries.
//!
//! A [`Conditions`] map is rendered as a flat WHERE clause: every entry is one
//! predicate and all predicates share the same [`Glue`]. There is no nesting.

use crate::escape::{is_null_literal, write_id, write_list, write_literal};
use crate::value::Value;

/// What a column is compared against.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `column = value`
    Equals(Value),
    /// `column IS NULL`
    IsNull,
    /// `column IN (v1,v2,...)`
    In(Vec<Value>),
}

impl Condition {
    pub fn equals(value: impl Into<Value>) -> Self {
        match value.into() {
            Value::Null => Condition::IsNull,
            v => Condition::Equals(v),
        }
    }

    pub fn is_null() -> Self {
        Condition::IsNull
    }

    pub fn any_of<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Self {
        Condition::In(values.into_iter().map(Into::into).collect())
    }

    /// Write `<column> <predicate>` for a WHERE clause.
    pub(crate) fn write_predicate(&self, out: &mut String, column: &str) {
        write_id(out, column);
        match self {
            Condition::Equals(v) if is_null_literal(v) => out.push_str(" IS NULL"),
            Condition::Equals(v) => {
                out.push_str(" = ");
                write_literal(out, v);
            }
            Condition::IsNull => out.push_str(" IS NULL"),
            Condition::In(values) => {
                out.push_str(" IN ");
                write_list(out, values);
            }
        }
    }

    /// Write the bare escaped value, as substituted for a `:name` token.
    pub(crate) fn write_value(&self, out: &mut String) {
        match self {
            Condition::Equals(v) => write_literal(out, v),
            Condition::IsNull => out.push_str("NULL"),
            Condition::In(values) => write_list(out, values),
        }
    }
}

macro_rules! condition_from {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Condition {
                fn from(v: $ty) -> Self {
                    Condition::equals(v)
                }
            }
        )+
    };
}

condition_from!(
    Value,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    bool,
    String,
    &str,
    &String,
    chrono::NaiveDate,
    chrono::NaiveDateTime,
    chrono::DateTime<chrono::Utc>,
    serde_json::Value,
);

impl<T: Into<Value>> From<Option<T>> for Condition {
    fn from(v: Option<T>) -> Self {
        Condition::equals(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Condition {
    fn from(values: Vec<T>) -> Self {
        Condition::any_of(values)
    }
}

impl<T: Into<Value> + Clone> From<&[T]> for Condition {
    fn from(values: &[T]) -> Self {
        Condition::any_of(values.iter().cloned())
    }
}

/// How the entries of a [`Conditions`] map are joined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Glue {
    #[default]
    And,
    Or,
}

impl Glue {
    pub fn as_sql(self) -> &'static str {
        match self {
            Glue::And => " AND ",
            Glue::Or => " OR ",
        }
    }
}

/// Ordered name → [`Condition`] map.
///
/// Structured queries render it as a WHERE clause; raw queries use it as the
/// values for `:name` placeholders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditions {
    entries: Vec<(String, Condition)>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry.
    pub fn set(mut self, name: impl Into<String>, condition: impl Into<Condition>) -> Self {
        self.insert(name, condition);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, condition: impl Into<Condition>) {
        let name = name.into();
        let condition = condition.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = condition,
            None => self.entries.push((name, condition)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Condition> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Condition)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), c))
    }

    /// Render the predicates joined by `glue`, without the `WHERE` keyword.
    pub fn to_sql(&self, glue: Glue) -> String {
        let mut out = String::new();
        self.write_sql(&mut out, glue);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String, glue: Glue) {
        for (i, (column, condition)) in self.entries.iter().enumerate() {
            if i > 0 {
                out.push_str(glue.as_sql());
            }
            condition.write_predicate(out, column);
        }
    }
}

impl<K: Into<String>, C: Into<Condition>> FromIterator<(K, C)> for Conditions {
    fn from_iter<I: IntoIterator<Item = (K, C)>>(iter: I) -> Self {
        let mut conditions = Conditions::new();
        for (k, c) in iter {
            conditions.insert(k, c);
        }
        conditions
    }
}

impl<K: Into<String>, C: Into<Condition>, const N: usize> From<[(K, C); N]> for Conditions {
    fn from(pairs: [(K, C); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, C: Into<Condition>> From<Vec<(K, C)>> for Conditions {
    fn from(pairs: Vec<(K, C)>) -> Self {
        pairs.into_iter().collect()
    }
}
