//! # zeal
//!
//! A small fluent query builder for MySQL on top of a `mysql_async` pool.
//!
//! ## Features
//!
//! - **Chaining API**: `table(..).select(..).conditions(..).asc(..).limit(..).many()`
//! - **Escaping everywhere**: identifiers are backtick-quoted, values are rendered as
//!   escaped literals; `NULL` conditions become `IS NULL`, lists become `IN (...)`
//! - **Raw statements**: `query_with(sql, values)` substitutes `:name` placeholders
//! - **One chokepoint**: every statement runs through [`Zeal::execute`] and the
//!   installed [`QueryHook`] (SQL logging via `tracing` by default)
//!
//! ## Usage
//!
//! ```ignore
//! use zeal::{PoolOptions, Record, Zeal};
//!
//! let zeal = Zeal::connect(&PoolOptions::from_url("mysql://root@localhost/app"))?;
//!
//! // SELECT `id`, `name` FROM `users` WHERE `team` IN (1,2) ORDER BY `name` ASC LIMIT 10
//! let rows = zeal
//!     .table("users")
//!     .select(["id", "name"])
//!     .conditions([("team", vec![1, 2])])
//!     .asc("name")
//!     .limit(10)
//!     .many()
//!     .await?;
//!
//! // INSERT INTO `users` SET `name` = 'alice', `team` = 1
//! let id = zeal
//!     .table("users")
//!     .data(Record::new().set("name", "alice").set("team", 1))
//!     .insert()
//!     .await?;
//!
//! // UPDATE `users` SET `team` = 2 WHERE `name` = 'alice'
//! zeal.table("users")
//!     .data([("team", 2)])
//!     .conditions([("name", "alice")])
//!     .update()
//!     .await?;
//!
//! // Raw SQL with named placeholders
//! let count = zeal
//!     .query_with("SELECT COUNT(*) FROM users WHERE team = :team", [("team", 2)])
//!     .field()
//!     .await?;
//! ```

pub mod builder;
pub mod client;
pub mod condition;
pub mod error;
pub mod escape;
pub mod facade;
pub mod format;
pub mod monitor;
pub mod pool;
pub mod value;

pub use builder::{Data, Direction, InsertOutcome, Limit, RawQuery, TableQuery};
pub use client::{Executor, QueryResult};
pub use condition::{Condition, Conditions, Glue};
pub use error::{ZealError, ZealResult};
pub use escape::{escape, escape_id, escape_list};
pub use facade::{Zeal, configure, global};
pub use format::format_named;
pub use monitor::{HookAction, QueryContext, QueryHook, QueryType};
pub use pool::{PoolOptions, create_pool};
pub use value::{Record, Row, Value};

#[cfg(feature = "tracing")]
pub use monitor::TracingSqlHook;
