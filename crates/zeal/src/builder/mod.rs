//! Fluent statement builders.
//!
//! There are two kinds of builder, chosen when the builder is created:
//!
//! - [`TableQuery`] (from [`crate::Zeal::table`]) synthesizes SELECT, INSERT,
//!   UPDATE, DELETE and TRUNCATE statements from its chained configuration.
//! - [`RawQuery`] (from [`crate::Zeal::query`]) runs a hand-written statement,
//!   substituting `:name` placeholders from its values.
//!
//! Terminal calls consume the builder, so one builder renders one statement.

mod raw;
mod table;

pub use raw::RawQuery;
pub use table::TableQuery;

use crate::client::QueryResult;
use crate::value::{Record, Row, Value};

/// Mutation payload: one record, or many for a bulk insert.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    Row(Record),
    Rows(Vec<Record>),
}

impl From<Record> for Data {
    fn from(record: Record) -> Self {
        Data::Row(record)
    }
}

impl From<Vec<Record>> for Data {
    fn from(records: Vec<Record>) -> Self {
        Data::Rows(records)
    }
}

impl<const N: usize> From<[Record; N]> for Data {
    fn from(records: [Record; N]) -> Self {
        Data::Rows(records.into())
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Data {
    fn from(pairs: [(K, V); N]) -> Self {
        Data::Row(pairs.into())
    }
}

/// Sort direction of an ORDER BY term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// LIMIT clause: a row count, or an offset and a row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Count(u64),
    OffsetCount(u64, u64),
}

impl Limit {
    pub fn to_sql(self) -> String {
        match self {
            Limit::Count(count) => count.to_string(),
            Limit::OffsetCount(offset, count) => format!("{offset}, {count}"),
        }
    }
}

impl From<u64> for Limit {
    fn from(count: u64) -> Self {
        Limit::Count(count)
    }
}

impl From<(u64, u64)> for Limit {
    fn from((offset, count): (u64, u64)) -> Self {
        Limit::OffsetCount(offset, count)
    }
}

/// What an insert resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The auto-increment id of the new row.
    Id(u64),
    /// The statement ran but the server generated no id (e.g. an upsert that
    /// only updated, or a table without auto-increment).
    Done,
    /// Bulk insert of zero rows: nothing was sent to the server.
    Skipped,
}

impl InsertOutcome {
    pub fn id(self) -> Option<u64> {
        match self {
            InsertOutcome::Id(id) => Some(id),
            _ => None,
        }
    }

    /// `false` only for [`InsertOutcome::Skipped`].
    pub fn executed(self) -> bool {
        !matches!(self, InsertOutcome::Skipped)
    }

    pub(crate) fn from_result(result: &QueryResult) -> Self {
        result
            .last_insert_id
            .map_or(InsertOutcome::Done, InsertOutcome::Id)
    }
}

pub(crate) fn first_row(rows: Vec<Row>) -> Option<Row> {
    rows.into_iter().next()
}

/// First column of the first row; falsy values collapse to `None`.
pub(crate) fn first_field(row: Option<Row>) -> Option<Value> {
    row.and_then(Row::into_first).filter(|v| !v.is_falsy())
}

pub(crate) fn first_column(rows: Vec<Row>) -> Vec<Value> {
    rows.into_iter()
        .map(|row| row.into_first().unwrap_or(Value::Null))
        .collect()
}

#[cfg(test)]
mod tests;
