//! Query hooks for observing (and vetoing) statements before they run.
//!
//! Every statement passes through [`crate::Zeal::execute`], which runs the
//! installed [`QueryHook`] first. With the `tracing` feature enabled,
//! [`TracingSqlHook`] logs each statement under the `zeal.sql` target.

mod types;

#[cfg(feature = "tracing")]
mod tracing_hook;

pub use types::{HookAction, QueryContext, QueryHook, QueryType};

#[cfg(feature = "tracing")]
pub use tracing_hook::TracingSqlHook;

/// Truncate to at most `max_bytes`, backing off to a char boundary.
#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
