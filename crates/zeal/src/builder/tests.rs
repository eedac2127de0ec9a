use super::*;
use crate::client::Executor;
use crate::condition::{Condition, Conditions};
use crate::error::{ZealError, ZealResult};
use crate::facade::Zeal;
use crate::monitor::{HookAction, QueryContext, QueryHook};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Executor that records every statement and replays queued results.
#[derive(Default)]
struct Recorder {
    statements: Mutex<Vec<String>>,
    responses: Mutex<VecDeque<ZealResult<QueryResult>>>,
}

impl Recorder {
    fn respond(self, result: ZealResult<QueryResult>) -> Self {
        self.responses.lock().unwrap().push_back(result);
        self
    }

    fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }
}

impl Executor for Recorder {
    async fn execute(&self, sql: &str) -> ZealResult<QueryResult> {
        self.statements.lock().unwrap().push(sql.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(QueryResult::default()))
    }
}

fn zeal() -> Zeal<Recorder> {
    Zeal::new(Recorder::default()).without_hook()
}

fn zeal_with(result: ZealResult<QueryResult>) -> Zeal<Recorder> {
    Zeal::new(Recorder::default().respond(result)).without_hook()
}

fn users() -> Vec<Row> {
    vec![
        Row::from_pairs([("id", Value::from(1)), ("name", Value::from("ann"))]),
        Row::from_pairs([("id", Value::from(2)), ("name", Value::from("bob"))]),
    ]
}

fn duplicate_key() -> ZealError {
    ZealError::Driver(mysql_async::Error::Server(mysql_async::ServerError {
        code: 1062,
        message: "Duplicate entry '1' for key 'PRIMARY'".to_string(),
        state: "23000".to_string(),
    }))
}

// ==================== SELECT rendering ====================

#[test]
fn test_select_defaults_to_star() {
    let z = zeal();
    assert_eq!(z.table("users").select_sql(), "SELECT * FROM `users`");
    assert_eq!(
        z.table("users").select(Vec::<String>::new()).select_sql(),
        "SELECT * FROM `users`"
    );
}

#[test]
fn test_select_star_is_not_escaped() {
    let z = zeal();
    assert_eq!(z.table("users").select(["*"]).select_sql(), "SELECT * FROM `users`");
}

#[test]
fn test_select_columns_are_escaped() {
    let z = zeal();
    assert_eq!(
        z.table("users").select(["a", "b"]).select_sql(),
        "SELECT `a`, `b` FROM `users`"
    );
    assert_eq!(
        z.table("users").select(vec!["u.id".to_string()]).select_sql(),
        "SELECT `u`.`id` FROM `users`"
    );
}

#[test]
fn test_select_with_every_clause() {
    let z = zeal();
    let sql = z
        .table("users")
        .select(["id"])
        .conditions([("status", "active")])
        .desc("created_at")
        .asc("id")
        .limit(10)
        .select_sql();
    assert_eq!(
        sql,
        "SELECT `id` FROM `users` WHERE `status` = 'active' \
         ORDER BY `created_at` DESC, `id` ASC LIMIT 10"
    );
}

#[test]
fn test_conditions_null_and_list() {
    let z = zeal();
    let sql = z
        .table("posts")
        .conditions(
            Conditions::new()
                .set("deleted_at", Value::Null)
                .set("author_id", vec![3, 4]),
        )
        .select_sql();
    assert_eq!(
        sql,
        "SELECT * FROM `posts` WHERE `deleted_at` IS NULL AND `author_id` IN (3,4)"
    );
    assert!(!sql.contains("= NULL"));
}

#[test]
fn test_or_switches_glue() {
    let z = zeal();
    let base = || z.table("t").conditions([("a", 1), ("b", 2)]);

    assert_eq!(base().or(true).select_sql(), "SELECT * FROM `t` WHERE `a` = 1 OR `b` = 2");
    assert_eq!(base().or(false).select_sql(), "SELECT * FROM `t` WHERE `a` = 1 AND `b` = 2");
    assert_eq!(base().select_sql(), "SELECT * FROM `t` WHERE `a` = 1 AND `b` = 2");
}

#[test]
fn test_empty_conditions_render_no_where() {
    let z = zeal();
    assert_eq!(
        z.table("t").conditions(Conditions::new()).select_sql(),
        "SELECT * FROM `t`"
    );
}

#[test]
fn test_limit_forms() {
    let z = zeal();
    assert_eq!(z.table("t").limit(10).select_sql(), "SELECT * FROM `t` LIMIT 10");
    assert_eq!(z.table("t").limit((5, 10)).select_sql(), "SELECT * FROM `t` LIMIT 5, 10");
}

#[test]
fn test_later_limit_replaces_earlier() {
    let z = zeal();
    assert_eq!(
        z.table("t").limit(3).limit((1, 2)).select_sql(),
        "SELECT * FROM `t` LIMIT 1, 2"
    );
}

// ==================== Mutation rendering ====================

#[test]
fn test_insert_single_row() {
    let z = zeal();
    let sql = z
        .table("users")
        .data(Record::new().set("name", "ann").set("age", 30))
        .insert_sql()
        .unwrap();
    assert_eq!(
        sql.as_deref(),
        Some("INSERT INTO `users` SET `name` = 'ann', `age` = 30")
    );
}

#[test]
fn test_insert_ignore() {
    let z = zeal();
    let sql = z.table("users").data([("id", 1)]).ignore(true).insert_sql().unwrap();
    assert_eq!(sql.as_deref(), Some("INSERT IGNORE INTO `users` SET `id` = 1"));
}

#[test]
fn test_bulk_insert_lists_columns_once() {
    let z = zeal();
    let sql = z
        .table("t")
        .data(vec![Record::from([("a", 1), ("b", 2)]), Record::from([("a", 3), ("b", 4)])])
        .insert_sql()
        .unwrap();
    assert_eq!(
        sql.as_deref(),
        Some("INSERT INTO `t` (`a`, `b`) VALUES (1,2),(3,4)")
    );
}

#[test]
fn test_bulk_insert_follows_first_row_columns() {
    let z = zeal();
    let sql = z
        .table("t")
        .ignore(true)
        .data([
            Record::new().set("a", 1).set("b", "x"),
            Record::new().set("b", "y").set("c", 9),
        ])
        .insert_sql()
        .unwrap();
    // Missing `a` becomes NULL, extra `c` is dropped, cells follow the first row's order.
    assert_eq!(
        sql.as_deref(),
        Some("INSERT IGNORE INTO `t` (`a`, `b`) VALUES (1,'x'),(NULL,'y')")
    );
}

#[test]
fn test_bulk_insert_of_nothing_renders_nothing() {
    let z = zeal();
    assert_eq!(z.table("t").data(Vec::<Record>::new()).insert_sql().unwrap(), None);
}

#[test]
fn test_insert_without_data_is_usage_error() {
    let z = zeal();
    let err = z.table("t").insert_sql().unwrap_err();
    assert!(matches!(err, ZealError::MissingData(_)));
    let err = z.table("t").data(Record::new()).insert_sql().unwrap_err();
    assert!(err.is_usage_error());
}

#[test]
fn test_update_with_conditions_and_limit() {
    let z = zeal();
    let sql = z
        .table("users")
        .data(Record::new().set("status", "gone").set("left_at", None::<i64>))
        .conditions([("id", vec![1, 2])])
        .limit(2)
        .update_sql()
        .unwrap();
    assert_eq!(
        sql,
        "UPDATE `users` SET `status` = 'gone', `left_at` = NULL WHERE `id` IN (1,2) LIMIT 2"
    );
}

#[test]
fn test_update_rejects_missing_or_bulk_data() {
    let z = zeal();
    assert!(matches!(z.table("t").update_sql(), Err(ZealError::MissingData(_))));
    assert!(matches!(
        z.table("t").data(vec![Record::from([("a", 1)])]).update_sql(),
        Err(ZealError::MissingData(_))
    ));
}

#[test]
fn test_delete_rendering() {
    let z = zeal();
    assert_eq!(z.table("t").delete_sql(), "DELETE FROM `t`");
    assert_eq!(
        z.table("t").conditions([("a", Condition::IsNull)]).limit(1).delete_sql(),
        "DELETE FROM `t` WHERE `a` IS NULL LIMIT 1"
    );
}

#[test]
fn test_truncate_ignores_other_options() {
    let z = zeal();
    let sql = z
        .table("logs")
        .conditions([("a", 1)])
        .limit(5)
        .desc("a")
        .truncate_sql();
    assert_eq!(sql, "TRUNCATE TABLE `logs`");
}

#[test]
fn test_values_are_escaped_in_every_clause() {
    let z = zeal();
    let evil = "x' OR '1'='1";
    let sql = z.table("t").conditions([("name", evil)]).select_sql();
    assert_eq!(sql, r"SELECT * FROM `t` WHERE `name` = 'x\' OR \'1\'=\'1'");
}

// ==================== Terminal calls ====================

#[tokio::test]
async fn test_many_returns_rows_in_order() {
    let z = zeal_with(Ok(QueryResult::from_rows(users())));
    let rows = z.table("users").many().await.unwrap();
    assert_eq!(rows, users());
    assert_eq!(z.executor().statements(), vec!["SELECT * FROM `users`"]);
}

#[tokio::test]
async fn test_one_returns_first_row() {
    let z = zeal_with(Ok(QueryResult::from_rows(users())));
    let row = z.table("users").one().await.unwrap().unwrap();
    assert_eq!(row.get("name"), Some(&Value::from("ann")));
}

#[tokio::test]
async fn test_field_returns_first_column_of_first_row() {
    let z = zeal_with(Ok(QueryResult::from_rows(users())));
    assert_eq!(z.table("users").field().await.unwrap(), Some(Value::Int(1)));
}

#[tokio::test]
async fn test_field_collapses_falsy_values() {
    let rows = vec![Row::from_pairs([("n", Value::from(0))])];
    let z = zeal_with(Ok(QueryResult::from_rows(rows)));
    assert_eq!(z.table("t").field().await.unwrap(), None);
}

#[tokio::test]
async fn test_column_collects_first_values() {
    let z = zeal_with(Ok(QueryResult::from_rows(users())));
    assert_eq!(
        z.table("users").column().await.unwrap(),
        vec![Value::Int(1), Value::Int(2)]
    );
}

#[tokio::test]
async fn test_empty_results() {
    let z = zeal();
    assert_eq!(z.table("t").many().await.unwrap(), Vec::<Row>::new());
    assert_eq!(z.table("t").one().await.unwrap(), None);
    assert_eq!(z.table("t").field().await.unwrap(), None);
    assert_eq!(z.table("t").column().await.unwrap(), Vec::<Value>::new());
}

#[tokio::test]
async fn test_insert_resolves_to_new_id() {
    let z = zeal_with(Ok(QueryResult::affected(1).with_insert_id(42)));
    let outcome = z.table("t").data([("a", 1)]).insert().await.unwrap();
    assert_eq!(outcome, InsertOutcome::Id(42));
    assert_eq!(outcome.id(), Some(42));
}

#[tokio::test]
async fn test_insert_without_id_resolves_done() {
    let z = zeal_with(Ok(QueryResult::affected(1)));
    let outcome = z.table("t").data([("a", 1)]).insert().await.unwrap();
    assert_eq!(outcome, InsertOutcome::Done);
    assert!(outcome.executed());
}

#[tokio::test]
async fn test_empty_bulk_insert_issues_no_query() {
    let z = zeal();
    let outcome = z.table("t").data(Vec::<Record>::new()).insert().await.unwrap();
    assert_eq!(outcome, InsertOutcome::Skipped);
    assert!(!outcome.executed());
    assert!(z.executor().statements().is_empty());
}

#[tokio::test]
async fn test_upsert_repeats_assignments() {
    let z = zeal();
    z.table("counters")
        .data(Record::new().set("name", "hits").set("n", 1))
        .upsert()
        .await
        .unwrap();
    let assignments = "`name` = 'hits', `n` = 1";
    assert_eq!(
        z.executor().statements(),
        vec![format!(
            "INSERT INTO `counters` SET {assignments} ON DUPLICATE KEY UPDATE {assignments}"
        )]
    );
}

#[tokio::test]
async fn test_update_without_data_fails_before_executing() {
    let z = zeal();
    let err = z.table("t").conditions([("id", 1)]).update().await.unwrap_err();
    assert!(err.is_usage_error());
    assert!(z.executor().statements().is_empty());
}

#[tokio::test]
async fn test_update_erase_truncate_return_driver_result() {
    let z = Zeal::new(
        Recorder::default()
            .respond(Ok(QueryResult::affected(3)))
            .respond(Ok(QueryResult::affected(2)))
            .respond(Ok(QueryResult::affected(0))),
    )
    .without_hook();

    let updated = z.table("t").data([("a", 1)]).update().await.unwrap();
    let erased = z.table("t").conditions([("a", 1)]).erase().await.unwrap();
    let truncated = z.table("t").truncate().await.unwrap();

    assert_eq!(updated.affected_rows, 3);
    assert_eq!(erased.affected_rows, 2);
    assert_eq!(truncated.affected_rows, 0);
    assert_eq!(
        z.executor().statements(),
        vec![
            "UPDATE `t` SET `a` = 1",
            "DELETE FROM `t` WHERE `a` = 1",
            "TRUNCATE TABLE `t`",
        ]
    );
}

#[tokio::test]
async fn test_driver_errors_propagate_unchanged() {
    let z = zeal_with(Err(duplicate_key()));
    let err = z.table("t").data([("id", 1)]).insert().await.unwrap_err();
    assert!(err.is_driver_error());
    assert_eq!(err.server_code(), Some(1062));
}

// ==================== Raw queries ====================

#[tokio::test]
async fn test_raw_query_substitutes_named_values() {
    let z = zeal_with(Ok(QueryResult::from_rows(users())));
    let rows = z
        .query_with("SELECT * FROM users WHERE id IN :ids AND x = :x", [("ids", vec![1, 2])])
        .many()
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(
        z.executor().statements(),
        vec!["SELECT * FROM users WHERE id IN (1,2) AND x = :x"]
    );
}

#[tokio::test]
async fn test_raw_query_conditions_are_placeholder_values_not_where() {
    let z = zeal();
    z.query("DELETE FROM logs WHERE day < :day")
        .conditions([("day", "2024-01-01")])
        .erase()
        .await
        .unwrap();
    assert_eq!(
        z.executor().statements(),
        vec!["DELETE FROM logs WHERE day < '2024-01-01'"]
    );
}

#[tokio::test]
async fn test_raw_update_never_needs_data() {
    let z = zeal_with(Ok(QueryResult::affected(5)));
    let result = z.query("UPDATE t SET a = a + 1").update().await.unwrap();
    assert_eq!(result.affected_rows, 5);
}

#[tokio::test]
async fn test_raw_insert_and_field() {
    let z = Zeal::new(
        Recorder::default()
            .respond(Ok(QueryResult::affected(1).with_insert_id(7)))
            .respond(Ok(QueryResult::from_rows(vec![Row::from_pairs([(
                "c",
                Value::from(12),
            )])]))),
    )
    .without_hook();

    let outcome = z
        .query_with("INSERT INTO t (name) VALUES (:name)", [("name", "ann")])
        .insert()
        .await
        .unwrap();
    assert_eq!(outcome, InsertOutcome::Id(7));

    let count = z.query("SELECT COUNT(*) AS c FROM t").field().await.unwrap();
    assert_eq!(count, Some(Value::Int(12)));
}

#[test]
fn test_raw_to_sql_preview() {
    let z = zeal();
    assert_eq!(
        z.query_with("SELECT :a, :b", [("a", Value::Null)]).to_sql(),
        "SELECT NULL, :b"
    );
}

// ==================== Hooks ====================

struct DenyTruncate;

impl QueryHook for DenyTruncate {
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        if ctx.query_type == crate::monitor::QueryType::Truncate {
            HookAction::Abort("TRUNCATE is disabled".to_string())
        } else {
            HookAction::Continue
        }
    }
}

#[tokio::test]
async fn test_hook_can_abort_before_execution() {
    let z = Zeal::new(Recorder::default()).with_hook(DenyTruncate);
    let err = z.table("t").truncate().await.unwrap_err();
    assert!(matches!(err, ZealError::Aborted(_)));
    assert!(z.executor().statements().is_empty());

    z.table("t").many().await.unwrap();
    assert_eq!(z.executor().statements(), vec!["SELECT * FROM `t`"]);
}

#[test]
fn test_facade_escape_helpers() {
    let z = zeal();
    assert_eq!(z.escape(&Value::from("a'b")), r"'a\'b'");
    assert_eq!(z.escape_list(&[Value::from(1), Value::from(2)]), "(1,2)");
}
