//! Raw builder: a hand-written statement with `:name` placeholders.

use super::{InsertOutcome, first_column, first_field, first_row};
use crate::client::{Executor, QueryResult};
use crate::condition::Conditions;
use crate::error::ZealResult;
use crate::facade::Zeal;
use crate::format::format_named;
use crate::value::{Row, Value};

/// Builder around a verbatim SQL string.
///
/// The values are never turned into a WHERE clause; they only fill the
/// statement's `:name` placeholders.
///
/// # Example
/// ```ignore
/// let names = zeal
///     .query_with("SELECT name FROM users WHERE team = :team", [("team", 4)])
///     .column()
///     .await?;
/// ```
#[derive(Debug, Clone)]
#[must_use = "a builder does nothing until a terminal call such as `many()` is awaited"]
pub struct RawQuery<'z, E: Executor> {
    zeal: &'z Zeal<E>,
    sql: String,
    values: Conditions,
}

impl<'z, E: Executor> RawQuery<'z, E> {
    pub(crate) fn new(zeal: &'z Zeal<E>, sql: impl Into<String>, values: Conditions) -> Self {
        Self {
            zeal,
            sql: sql.into(),
            values,
        }
    }

    /// Replace the placeholder values.
    pub fn conditions(mut self, values: impl Into<Conditions>) -> Self {
        self.values = values.into();
        self
    }

    /// The statement with placeholders substituted, as it will be sent.
    pub fn to_sql(&self) -> String {
        format_named(&self.sql, &self.values).into_owned()
    }

    async fn run(self) -> ZealResult<QueryResult> {
        self.zeal.execute_with(&self.sql, &self.values).await
    }

    pub async fn many(self) -> ZealResult<Vec<Row>> {
        Ok(self.run().await?.rows)
    }

    pub async fn one(self) -> ZealResult<Option<Row>> {
        self.many().await.map(first_row)
    }

    pub async fn field(self) -> ZealResult<Option<Value>> {
        self.one().await.map(first_field)
    }

    pub async fn column(self) -> ZealResult<Vec<Value>> {
        self.many().await.map(first_column)
    }

    pub async fn insert(self) -> ZealResult<InsertOutcome> {
        let result = self.run().await?;
        Ok(InsertOutcome::from_result(&result))
    }

    pub async fn update(self) -> ZealResult<QueryResult> {
        self.run().await
    }

    pub async fn erase(self) -> ZealResult<QueryResult> {
        self.run().await
    }
}
