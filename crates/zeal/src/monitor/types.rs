use crate::client::QueryResult;
use std::time::Duration;

/// The kind of statement being executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
    Truncate,
    /// Anything else (DDL, SHOW, CALL, ...)
    Other,
}

impl QueryType {
    /// Classify a statement by its leading keyword.
    pub fn from_sql(sql: &str) -> Self {
        let keyword = sql
            .trim_start_matches(|c: char| c.is_whitespace() || c == '(')
            .split(|c: char| !c.is_ascii_alphabetic())
            .next()
            .unwrap_or("");

        if keyword.eq_ignore_ascii_case("SELECT") {
            QueryType::Select
        } else if keyword.eq_ignore_ascii_case("INSERT") || keyword.eq_ignore_ascii_case("REPLACE")
        {
            QueryType::Insert
        } else if keyword.eq_ignore_ascii_case("UPDATE") {
            QueryType::Update
        } else if keyword.eq_ignore_ascii_case("DELETE") {
            QueryType::Delete
        } else if keyword.eq_ignore_ascii_case("TRUNCATE") {
            QueryType::Truncate
        } else {
            QueryType::Other
        }
    }
}

/// What a hook sees about a statement.
#[derive(Debug, Clone)]
pub struct QueryContext {
    /// The SQL text sent to the server, after placeholder substitution.
    pub sql: String,
    /// Detected statement kind.
    pub query_type: QueryType,
}

impl QueryContext {
    pub fn new(sql: &str) -> Self {
        Self {
            sql: sql.to_string(),
            query_type: QueryType::from_sql(sql),
        }
    }
}

/// Decision returned by [`QueryHook::before_query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookAction {
    /// Run the statement.
    Continue,
    /// Do not run it; the terminal call fails with [`crate::ZealError::Aborted`].
    Abort(String),
}

/// Hook into statement execution.
pub trait QueryHook: Send + Sync {
    /// Called before a statement is sent to the server.
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        let _ = ctx;
        HookAction::Continue
    }

    /// Called after a statement completed successfully.
    fn after_query(&self, _ctx: &QueryContext, _duration: Duration, _result: &QueryResult) {}
}
