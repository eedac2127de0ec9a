//! The execution seam between query building and the MySQL driver.

use crate::error::{ZealError, ZealResult};
use crate::value::{Row, Value};
use chrono::{NaiveDate, NaiveDateTime};
use mysql_async::consts::{ColumnFlags, ColumnType};
use mysql_async::prelude::Queryable;
use std::sync::Arc;

/// Character set id MySQL reports for binary strings and blobs.
const BINARY_CHARSET: u16 = 63;

/// What the driver reports for one statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Result rows (empty for statements that return none).
    pub rows: Vec<Row>,
    /// Rows changed, inserted or deleted.
    pub affected_rows: u64,
    /// Auto-increment id generated by the statement, if any.
    pub last_insert_id: Option<u64>,
    /// Number of warnings raised by the statement.
    pub warnings: u16,
    /// Server info string (e.g. `Rows matched: 1  Changed: 1  Warnings: 0`).
    pub info: String,
}

impl QueryResult {
    /// A result carrying rows only.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// A result carrying an affected-row count only.
    pub fn affected(affected_rows: u64) -> Self {
        Self {
            affected_rows,
            ..Self::default()
        }
    }

    pub fn with_insert_id(mut self, id: u64) -> Self {
        self.last_insert_id = Some(id);
        self
    }
}

/// Anything that can run one SQL statement and report its result.
///
/// Implemented for [`mysql_async::Pool`]. Tests and alternative backends can
/// implement it to capture or fake statements.
pub trait Executor: Send + Sync {
    /// Run `sql` verbatim.
    fn execute(&self, sql: &str)
    -> impl std::future::Future<Output = ZealResult<QueryResult>> + Send;
}

impl<E: Executor> Executor for Arc<E> {
    fn execute(
        &self,
        sql: &str,
    ) -> impl std::future::Future<Output = ZealResult<QueryResult>> + Send {
        (**self).execute(sql)
    }
}

impl Executor for mysql_async::Pool {
    async fn execute(&self, sql: &str) -> ZealResult<QueryResult> {
        let mut conn = self.get_conn().await?;
        let mut result = conn.query_iter(sql).await?;

        let raw_rows: Vec<mysql_async::Row> = result.collect().await?;
        let rows = convert_rows(raw_rows)?;

        let out = QueryResult {
            rows,
            affected_rows: result.affected_rows(),
            last_insert_id: result.last_insert_id().filter(|id| *id != 0),
            warnings: result.warnings(),
            info: result.info().into_owned(),
        };
        result.drop_result().await?;
        Ok(out)
    }
}

fn convert_rows(raw_rows: Vec<mysql_async::Row>) -> ZealResult<Vec<Row>> {
    let Some(first) = raw_rows.first() else {
        return Ok(Vec::new());
    };
    let meta = first.columns();
    let names: Arc<[String]> = meta.iter().map(|c| c.name_str().into_owned()).collect();

    let mut rows = Vec::with_capacity(raw_rows.len());
    for mut raw in raw_rows {
        let mut values = Vec::with_capacity(meta.len());
        for (i, column) in meta.iter().enumerate() {
            let cell = raw.take(i).unwrap_or(mysql_async::Value::NULL);
            values.push(decode_cell(
                &names[i],
                column.column_type(),
                column.flags(),
                column.character_set(),
                cell,
            )?);
        }
        rows.push(Row::new(names.clone(), values));
    }
    Ok(rows)
}

/// Convert one driver cell to a [`Value`] using the column metadata.
///
/// The text protocol delivers every non-NULL cell as bytes; the column type
/// decides how they are read back.
pub(crate) fn decode_cell(
    column: &str,
    ty: ColumnType,
    flags: ColumnFlags,
    charset: u16,
    raw: mysql_async::Value,
) -> ZealResult<Value> {
    use mysql_async::Value as My;

    let bytes = match raw {
        My::NULL => return Ok(Value::Null),
        My::Int(i) => return Ok(Value::Int(i)),
        My::UInt(u) => return Ok(Value::UInt(u)),
        My::Float(f) => return Ok(Value::Float(f64::from(f))),
        My::Double(f) => return Ok(Value::Float(f)),
        My::Date(year, month, day, hour, minute, second, micros) => {
            return Ok(binary_date(ty, year, month, day, hour, minute, second, micros));
        }
        My::Time(negative, days, hours, minutes, seconds, micros) => {
            let hours = u64::from(days) * 24 + u64::from(hours);
            let sign = if negative { "-" } else { "" };
            let mut text = format!("{sign}{hours:02}:{minutes:02}:{seconds:02}");
            if micros > 0 {
                text.push_str(&format!(".{micros:06}"));
            }
            return Ok(Value::Text(text));
        }
        My::Bytes(bytes) => bytes,
    };

    let text = |bytes: Vec<u8>| {
        String::from_utf8(bytes).map_err(|e| ZealError::decode(column, e.to_string()))
    };

    match ty {
        ColumnType::MYSQL_TYPE_TINY
        | ColumnType::MYSQL_TYPE_SHORT
        | ColumnType::MYSQL_TYPE_LONG
        | ColumnType::MYSQL_TYPE_INT24
        | ColumnType::MYSQL_TYPE_LONGLONG
        | ColumnType::MYSQL_TYPE_YEAR => {
            let s = text(bytes)?;
            if flags.contains(ColumnFlags::UNSIGNED_FLAG) {
                s.parse::<u64>()
                    .map(Value::UInt)
                    .map_err(|e| ZealError::decode(column, format!("{e}: {s:?}")))
            } else {
                s.parse::<i64>()
                    .map(Value::Int)
                    .map_err(|e| ZealError::decode(column, format!("{e}: {s:?}")))
            }
        }
        ColumnType::MYSQL_TYPE_FLOAT | ColumnType::MYSQL_TYPE_DOUBLE => {
            let s = text(bytes)?;
            s.parse::<f64>()
                .map(Value::Float)
                .map_err(|e| ZealError::decode(column, format!("{e}: {s:?}")))
        }
        ColumnType::MYSQL_TYPE_DATE | ColumnType::MYSQL_TYPE_NEWDATE => {
            let s = text(bytes)?;
            // Zero dates ('0000-00-00') are legal in MySQL and stay text.
            Ok(NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .map(Value::Date)
                .unwrap_or(Value::Text(s)))
        }
        ColumnType::MYSQL_TYPE_DATETIME
        | ColumnType::MYSQL_TYPE_DATETIME2
        | ColumnType::MYSQL_TYPE_TIMESTAMP
        | ColumnType::MYSQL_TYPE_TIMESTAMP2 => {
            let s = text(bytes)?;
            Ok(NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S%.f")
                .map(Value::DateTime)
                .unwrap_or(Value::Text(s)))
        }
        ColumnType::MYSQL_TYPE_JSON => serde_json::from_slice(&bytes)
            .map(Value::Json)
            .map_err(|e| ZealError::decode(column, e.to_string())),
        ColumnType::MYSQL_TYPE_BIT => Ok(Value::Bytes(bytes)),
        ColumnType::MYSQL_TYPE_TINY_BLOB
        | ColumnType::MYSQL_TYPE_MEDIUM_BLOB
        | ColumnType::MYSQL_TYPE_LONG_BLOB
        | ColumnType::MYSQL_TYPE_BLOB
        | ColumnType::MYSQL_TYPE_STRING
        | ColumnType::MYSQL_TYPE_VAR_STRING
        | ColumnType::MYSQL_TYPE_VARCHAR
        | ColumnType::MYSQL_TYPE_GEOMETRY
            if charset == BINARY_CHARSET =>
        {
            Ok(Value::Bytes(bytes))
        }
        _ => text(bytes).map(Value::Text),
    }
}

#[allow(clippy::too_many_arguments)]
fn binary_date(
    ty: ColumnType,
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    micros: u32,
) -> Value {
    let Some(date) = NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))
    else {
        return Value::Text(format!(
            "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}"
        ));
    };
    if matches!(ty, ColumnType::MYSQL_TYPE_DATE | ColumnType::MYSQL_TYPE_NEWDATE) {
        return Value::Date(date);
    }
    date.and_hms_micro_opt(u32::from(hour), u32::from(minute), u32::from(second), micros)
        .map_or(Value::Date(date), Value::DateTime)
}
