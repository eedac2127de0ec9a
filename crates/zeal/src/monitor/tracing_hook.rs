use super::truncate_sql_bytes;
use super::types::{HookAction, QueryContext, QueryHook};
use crate::client::QueryResult;
use std::time::Duration;
use tracing::Level;

/// A `tracing`-based hook that emits every statement before it is executed,
/// and its row counts and duration after it completed.
///
/// Enable via the crate feature: `zeal = { features = ["tracing"] }` (on by default).
#[derive(Debug, Clone)]
pub struct TracingSqlHook {
    /// Tracing event level to emit at.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for TracingSqlHook {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }
}

impl TracingSqlHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub(crate) fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }
}

/// Dispatch a tracing event at a runtime-determined level.
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN  => tracing::warn!($($field)*),
            Level::INFO  => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

impl QueryHook for TracingSqlHook {
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        let sql = self.truncate_sql(&ctx.sql);
        emit_at_level!(
            self.level,
            target: "zeal.sql",
            query_type = ?ctx.query_type,
            sql = %sql,
        );
        HookAction::Continue
    }

    fn after_query(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        emit_at_level!(
            self.level,
            target: "zeal.sql",
            query_type = ?ctx.query_type,
            rows = result.rows.len(),
            affected_rows = result.affected_rows,
            elapsed_us = duration.as_micros() as u64,
            "query finished"
        );
    }
}
