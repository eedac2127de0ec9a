//! The facade: owns the executor and hands out builders.

use crate::builder::{RawQuery, TableQuery};
use crate::client::{Executor, QueryResult};
use crate::condition::Conditions;
use crate::error::{ZealError, ZealResult};
use crate::escape;
use crate::format::format_named;
use crate::monitor::{HookAction, QueryContext, QueryHook};
use crate::pool::{PoolOptions, create_pool};
use crate::value::Value;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Instant;

/// Entry point for building and running statements.
///
/// Holds the executor (normally a [`mysql_async::Pool`]) and an optional
/// [`QueryHook`]. Pass it by reference to wherever queries are built; for a
/// single process-wide instance use [`configure`] and [`global`].
///
/// # Example
/// ```ignore
/// let zeal = Zeal::connect(&PoolOptions::from_url("mysql://root@localhost/app"))?;
/// let user = zeal.table("users").conditions([("id", 7)]).one().await?;
/// ```
pub struct Zeal<E: Executor = mysql_async::Pool> {
    executor: E,
    hook: Option<Arc<dyn QueryHook>>,
}

impl<E: Executor + fmt::Debug> fmt::Debug for Zeal<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Zeal")
            .field("executor", &self.executor)
            .field("hook", &self.hook.as_ref().map(|_| "<dyn QueryHook>"))
            .finish()
    }
}

impl Zeal<mysql_async::Pool> {
    /// Build a pool from `options` and wrap it. No connection is opened yet.
    pub fn connect(options: &PoolOptions) -> ZealResult<Self> {
        Ok(Self::new(create_pool(options)?))
    }

    /// Close every pooled connection.
    pub async fn disconnect(self) -> ZealResult<()> {
        self.executor.disconnect().await?;
        Ok(())
    }
}

impl<E: Executor> Zeal<E> {
    /// Wrap an executor. With the `tracing` feature a [`crate::TracingSqlHook`]
    /// is installed.
    pub fn new(executor: E) -> Self {
        #[cfg(feature = "tracing")]
        let hook: Option<Arc<dyn QueryHook>> = Some(Arc::new(crate::TracingSqlHook::new()));
        #[cfg(not(feature = "tracing"))]
        let hook: Option<Arc<dyn QueryHook>> = None;

        Self { executor, hook }
    }

    /// Replace the query hook.
    pub fn with_hook(mut self, hook: impl QueryHook + 'static) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Remove the query hook.
    pub fn without_hook(mut self) -> Self {
        self.hook = None;
        self
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Structured builder for `table`.
    pub fn table(&self, table: impl Into<String>) -> TableQuery<'_, E> {
        TableQuery::new(self, table)
    }

    /// Raw builder for a hand-written statement.
    pub fn query(&self, sql: impl Into<String>) -> RawQuery<'_, E> {
        RawQuery::new(self, sql, Conditions::new())
    }

    /// Raw builder with values for its `:name` placeholders.
    pub fn query_with(
        &self,
        sql: impl Into<String>,
        values: impl Into<Conditions>,
    ) -> RawQuery<'_, E> {
        RawQuery::new(self, sql, values.into())
    }

    /// Escape a value as a SQL literal.
    pub fn escape(&self, value: &Value) -> String {
        escape::escape(value)
    }

    /// Escape values as a parenthesized list, as used by `IN (...)`.
    pub fn escape_list(&self, values: &[Value]) -> String {
        escape::escape_list(values)
    }

    /// Run a statement verbatim.
    ///
    /// Every builder terminal call ends here. Driver errors are returned unchanged.
    pub async fn execute(&self, sql: &str) -> ZealResult<QueryResult> {
        let Some(hook) = &self.hook else {
            return self.executor.execute(sql).await;
        };

        let ctx = QueryContext::new(sql);
        if let HookAction::Abort(reason) = hook.before_query(&ctx) {
            return Err(ZealError::Aborted(reason));
        }
        let start = Instant::now();
        let result = self.executor.execute(sql).await?;
        hook.after_query(&ctx, start.elapsed(), &result);
        Ok(result)
    }

    /// Substitute `:name` placeholders from `values`, then run the statement.
    pub async fn execute_with(&self, sql: &str, values: &Conditions) -> ZealResult<QueryResult> {
        let sql = format_named(sql, values);
        self.execute(&sql).await
    }
}

static GLOBAL: OnceLock<Zeal> = OnceLock::new();

/// Held across the check and the pool build so racing calls build one pool.
static CONFIGURE_LOCK: Mutex<()> = Mutex::new(());

/// Install the process-wide facade.
///
/// Only the first call succeeds; later calls fail with
/// [`ZealError::AlreadyConfigured`] without building a pool and leave the
/// installed facade untouched, including calls racing from other threads.
/// Must run inside a Tokio runtime.
pub fn configure(options: &PoolOptions) -> ZealResult<&'static Zeal> {
    let _guard = CONFIGURE_LOCK
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if GLOBAL.get().is_some() {
        return Err(ZealError::AlreadyConfigured);
    }
    let zeal = Zeal::connect(options)?;
    GLOBAL
        .set(zeal)
        .map_err(|_| ZealError::AlreadyConfigured)?;
    global()
}

/// The facade installed by [`configure`].
pub fn global() -> ZealResult<&'static Zeal> {
    GLOBAL.get().ok_or(ZealError::NotConfigured)
}
