//! Structured builder: statements synthesized from a table name and chained options.

use super::{Data, Direction, InsertOutcome, Limit, first_column, first_field, first_row};
use crate::client::{Executor, QueryResult};
use crate::condition::{Conditions, Glue};
use crate::error::{ZealError, ZealResult};
use crate::escape::{write_id, write_literal};
use crate::facade::Zeal;
use crate::value::{Record, Row, Value};

/// Builder bound to one table.
///
/// # Example
/// ```ignore
/// let rows = zeal
///     .table("users")
///     .select(["id", "name"])
///     .conditions([("status", "active")])
///     .desc("created_at")
///     .limit(10)
///     .many()
///     .await?;
/// ```
#[derive(Debug, Clone)]
#[must_use = "a builder does nothing until a terminal call such as `many()` is awaited"]
pub struct TableQuery<'z, E: Executor> {
    zeal: &'z Zeal<E>,
    table: String,
    select: Vec<String>,
    conditions: Option<Conditions>,
    glue: Glue,
    data: Option<Data>,
    order: Vec<(String, Direction)>,
    limit: Option<Limit>,
    ignore: bool,
    upsert: bool,
}

impl<'z, E: Executor> TableQuery<'z, E> {
    pub(crate) fn new(zeal: &'z Zeal<E>, table: impl Into<String>) -> Self {
        Self {
            zeal,
            table: table.into(),
            select: Vec::new(),
            conditions: None,
            glue: Glue::And,
            data: None,
            order: Vec::new(),
            limit: None,
            ignore: false,
            upsert: false,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    // ==================== Chaining ====================

    /// Columns to select. `*` is passed through; an empty list selects `*`.
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Join conditions with `OR` instead of `AND`.
    pub fn or(mut self, enabled: bool) -> Self {
        self.glue = if enabled { Glue::Or } else { Glue::And };
        self
    }

    /// Filter used by SELECT, UPDATE and DELETE.
    pub fn conditions(mut self, conditions: impl Into<Conditions>) -> Self {
        self.conditions = Some(conditions.into());
        self
    }

    /// Mutation payload for INSERT and UPDATE. Many records make a bulk insert.
    pub fn data(mut self, data: impl Into<Data>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn asc(mut self, column: impl Into<String>) -> Self {
        self.order.push((column.into(), Direction::Asc));
        self
    }

    pub fn desc(mut self, column: impl Into<String>) -> Self {
        self.order.push((column.into(), Direction::Desc));
        self
    }

    /// `limit(10)` → `LIMIT 10`; `limit((5, 10))` → `LIMIT 5, 10`.
    pub fn limit(mut self, limit: impl Into<Limit>) -> Self {
        self.limit = Some(limit.into());
        self
    }

    /// Render `INSERT IGNORE` instead of `INSERT`.
    pub fn ignore(mut self, enabled: bool) -> Self {
        self.ignore = enabled;
        self
    }

    // ==================== Rendering ====================

    fn write_select_list(&self, out: &mut String) {
        if self.select.is_empty() {
            out.push('*');
            return;
        }
        for (i, column) in self.select.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            if column == "*" {
                out.push('*');
            } else {
                write_id(out, column);
            }
        }
    }

    fn write_where(&self, out: &mut String) {
        if let Some(conditions) = self.conditions.as_ref().filter(|c| !c.is_empty()) {
            out.push_str(" WHERE ");
            conditions.write_sql(out, self.glue);
        }
    }

    fn write_order(&self, out: &mut String) {
        for (i, (column, direction)) in self.order.iter().enumerate() {
            out.push_str(if i == 0 { " ORDER BY " } else { ", " });
            write_id(out, column);
            out.push(' ');
            out.push_str(direction.as_sql());
        }
    }

    fn write_limit(&self, out: &mut String) {
        if let Some(limit) = self.limit {
            out.push_str(" LIMIT ");
            out.push_str(&limit.to_sql());
        }
    }

    fn write_insert_head(&self, out: &mut String) {
        out.push_str(if self.ignore {
            "INSERT IGNORE INTO "
        } else {
            "INSERT INTO "
        });
        write_id(out, &self.table);
    }

    /// `SELECT <columns> FROM <table> [WHERE ..] [ORDER BY ..] [LIMIT ..]`
    pub fn select_sql(&self) -> String {
        let mut sql = String::from("SELECT ");
        self.write_select_list(&mut sql);
        sql.push_str(" FROM ");
        write_id(&mut sql, &self.table);
        self.write_where(&mut sql);
        self.write_order(&mut sql);
        self.write_limit(&mut sql);
        sql
    }

    /// The INSERT statement, or `None` for a bulk insert of zero records.
    pub fn insert_sql(&self) -> ZealResult<Option<String>> {
        match &self.data {
            None => Err(ZealError::missing_data("INSERT needs data")),
            Some(Data::Rows(records)) => Ok(self.bulk_insert_sql(records)),
            Some(Data::Row(record)) if record.is_empty() => {
                Err(ZealError::missing_data("INSERT needs at least one column"))
            }
            Some(Data::Row(record)) => {
                let mut sql = String::new();
                self.write_insert_head(&mut sql);
                sql.push_str(" SET ");
                let assignments = assignments_sql(record);
                sql.push_str(&assignments);
                if self.upsert {
                    sql.push_str(" ON DUPLICATE KEY UPDATE ");
                    sql.push_str(&assignments);
                }
                Ok(Some(sql))
            }
        }
    }

    /// Multi-row insert. The first record decides the column list: columns a
    /// later record lacks are written as NULL, extra columns are dropped.
    fn bulk_insert_sql(&self, records: &[Record]) -> Option<String> {
        let first = records.first()?;
        let columns: Vec<&str> = first.columns().collect();

        let mut sql = String::new();
        self.write_insert_head(&mut sql);
        sql.push_str(" (");
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            write_id(&mut sql, column);
        }
        sql.push_str(") VALUES ");

        for (r, record) in records.iter().enumerate() {
            if r > 0 {
                sql.push(',');
            }
            sql.push('(');
            for (i, column) in columns.iter().enumerate() {
                if i > 0 {
                    sql.push(',');
                }
                write_literal(&mut sql, record.get(column).unwrap_or(&Value::Null));
            }
            sql.push(')');
        }
        Some(sql)
    }

    /// `UPDATE <table> SET <assignments> [WHERE ..] [LIMIT ..]`
    pub fn update_sql(&self) -> ZealResult<String> {
        let record = match &self.data {
            Some(Data::Row(record)) if !record.is_empty() => record,
            Some(Data::Rows(_)) => {
                return Err(ZealError::missing_data(
                    "UPDATE takes a single record, not a list",
                ));
            }
            _ => return Err(ZealError::missing_data("Missing data for an UPDATE query")),
        };

        let mut sql = String::from("UPDATE ");
        write_id(&mut sql, &self.table);
        sql.push_str(" SET ");
        sql.push_str(&assignments_sql(record));
        self.write_where(&mut sql);
        self.write_limit(&mut sql);
        Ok(sql)
    }

    /// `DELETE FROM <table> [WHERE ..] [LIMIT ..]`
    pub fn delete_sql(&self) -> String {
        let mut sql = String::from("DELETE FROM ");
        write_id(&mut sql, &self.table);
        self.write_where(&mut sql);
        self.write_limit(&mut sql);
        sql
    }

    /// `TRUNCATE TABLE <table>`; every other option is ignored.
    pub fn truncate_sql(&self) -> String {
        let mut sql = String::from("TRUNCATE TABLE ");
        write_id(&mut sql, &self.table);
        sql
    }

    // ==================== Terminal calls ====================

    /// All matching rows.
    pub async fn many(self) -> ZealResult<Vec<Row>> {
        let sql = self.select_sql();
        Ok(self.zeal.execute(&sql).await?.rows)
    }

    /// The first matching row, or `None`.
    pub async fn one(self) -> ZealResult<Option<Row>> {
        self.many().await.map(first_row)
    }

    /// First column of the first matching row; `None` if there is no row or the value is falsy.
    pub async fn field(self) -> ZealResult<Option<Value>> {
        self.one().await.map(first_field)
    }

    /// First column of every matching row.
    pub async fn column(self) -> ZealResult<Vec<Value>> {
        self.many().await.map(first_column)
    }

    /// Insert the data. Resolves to the new row id when the server generated one.
    pub async fn insert(self) -> ZealResult<InsertOutcome> {
        let Some(sql) = self.insert_sql()? else {
            return Ok(InsertOutcome::Skipped);
        };
        let result = self.zeal.execute(&sql).await?;
        Ok(InsertOutcome::from_result(&result))
    }

    /// Insert, updating the same columns on a duplicate key.
    pub async fn upsert(mut self) -> ZealResult<InsertOutcome> {
        self.upsert = true;
        self.insert().await
    }

    pub async fn update(self) -> ZealResult<QueryResult> {
        let sql = self.update_sql()?;
        self.zeal.execute(&sql).await
    }

    /// Delete matching rows. Without conditions every row is deleted.
    pub async fn erase(self) -> ZealResult<QueryResult> {
        let sql = self.delete_sql();
        self.zeal.execute(&sql).await
    }

    pub async fn truncate(self) -> ZealResult<QueryResult> {
        let sql = self.truncate_sql();
        self.zeal.execute(&sql).await
    }
}

fn assignments_sql(record: &Record) -> String {
    let mut out = String::new();
    for (i, (column, value)) in record.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_id(&mut out, column);
        out.push_str(" = ");
        write_literal(&mut out, value);
    }
    out
}
