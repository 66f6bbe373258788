use super::*;
use crate::recording::RecordingConnection;
use serde::Deserialize;
use serde_json::json;

fn recording() -> (Arc<RecordingConnection>, Surql) {
    let conn = Arc::new(RecordingConnection::accepting());
    let surql = Surql::new(conn.clone());
    (conn, surql)
}

#[test]
fn test_split_statements_drops_empty_segments() {
    assert_eq!(
        split_statements("  SELECT 1;; ;\n SELECT 2  ;"),
        vec!["SELECT 1", "SELECT 2"]
    );
    assert!(split_statements(" ; ").is_empty());
}

#[test]
fn test_split_statements_keeps_nested_semicolons() {
    assert_eq!(
        split_statements(
            "DEFINE FUNCTION fn::greet($n: string) { LET $x = 'hi;'; RETURN $x + $n; }; SELECT 1"
        ),
        vec![
            "DEFINE FUNCTION fn::greet($n: string) { LET $x = 'hi;'; RETURN $x + $n; }",
            "SELECT 1",
        ]
    );
    assert_eq!(
        split_statements(r#"CREATE x SET note = "a \"quoted\"; value"; SELECT 1"#).len(),
        2
    );
}

#[test]
fn test_split_statements_skips_comments() {
    assert_eq!(
        split_statements(
            "DEFINE FUNCTION fn::f() { RETURN 1; -- it's fine\n };\nCREATE audit SET at = time::now();"
        ),
        vec![
            "DEFINE FUNCTION fn::f() { RETURN 1; -- it's fine\n }",
            "CREATE audit SET at = time::now()",
        ]
    );
    assert_eq!(
        split_statements("/* don't; split */ SELECT 1; # isn't code;\nSELECT 2 // won't; either\n;"),
        vec!["/* don't; split */ SELECT 1", "# isn't code;\nSELECT 2"]
    );
}

#[test]
fn test_split_statements_drops_comment_only_segments() {
    assert_eq!(
        split_statements("SELECT 1; -- trailing note"),
        vec!["SELECT 1"]
    );
    assert!(split_statements("-- nothing here;\n/* or here */").is_empty());
}

#[tokio::test]
async fn test_inline_comment_keeps_transaction_wrap() {
    let (conn, surql) = recording();
    surql
        .query("DEFINE FUNCTION fn::f() { RETURN 1; -- it's fine\n };\nCREATE audit SET at = time::now();")
        .execute()
        .await
        .unwrap();

    assert_eq!(
        conn.submissions()[0].sql,
        "BEGIN TRANSACTION;\nDEFINE FUNCTION fn::f() { RETURN 1; -- it's fine\n };\nCREATE audit SET at = time::now();\nCOMMIT TRANSACTION;"
    );
}

#[tokio::test]
async fn test_trailing_comment_does_not_swallow_terminator() {
    let (conn, surql) = recording();
    surql
        .query("DEFINE TABLE a -- first\n;\nDEFINE TABLE b;")
        .execute()
        .await
        .unwrap();

    assert_eq!(
        conn.submissions()[0].sql,
        "BEGIN TRANSACTION;\nDEFINE TABLE a;\nDEFINE TABLE b;\nCOMMIT TRANSACTION;"
    );
}

#[tokio::test]
async fn test_query_is_lazy() {
    let (conn, surql) = recording();
    let query = surql.query("SELECT * FROM users");

    assert!(!query.is_executed());
    assert!(conn.submissions().is_empty());

    query.execute().await.unwrap();
    assert!(query.is_executed());
    assert_eq!(conn.submissions().len(), 1);
}

#[tokio::test]
async fn test_single_statement_is_sent_unwrapped() {
    let (conn, surql) = recording();
    surql.query("INFO FOR ROOT").execute().await.unwrap();

    assert_eq!(conn.submissions()[0].sql, "INFO FOR ROOT");
}

#[tokio::test]
async fn test_multiple_statements_are_wrapped_in_transaction() {
    let (conn, surql) = recording();
    let response = surql
        .query("USE NS app DB main;\n  DEFINE TABLE users;\n;")
        .execute()
        .await
        .unwrap()
        .clone();

    assert_eq!(
        conn.submissions()[0].sql,
        "BEGIN TRANSACTION;\nUSE NS app DB main;\nDEFINE TABLE users;\nCOMMIT TRANSACTION;"
    );
    assert_eq!(response.len(), 2);
}

#[tokio::test]
async fn test_execute_is_memoized() {
    let (conn, surql) = recording();
    let query = surql.query("SELECT 1");

    let first = query.execute().await.unwrap().clone();
    let second = query.execute().await.unwrap().clone();

    assert_eq!(first, second);
    assert_eq!(conn.submissions().len(), 1);
}

#[tokio::test]
async fn test_failure_is_memoized() {
    let conn = Arc::new(RecordingConnection::new(|_, _| {
        Err(DbError::StatementFailed {
            index: 0,
            message: "boom".to_string(),
        })
    }));
    let surql = Surql::new(conn.clone());
    let query = surql.query("THROW 'boom'");

    let first = query.execute().await.unwrap_err();
    let second = query.execute().await.unwrap_err();

    assert_eq!(first, second);
    assert_eq!(conn.submissions().len(), 1);
}

#[tokio::test]
async fn test_vars_merge_shallowly() {
    let (conn, surql) = recording();
    let mut first = Vars::new();
    first.insert("a".to_string(), json!(1));
    first.insert("b".to_string(), json!({ "nested": true }));
    let mut second = Vars::new();
    second.insert("b".to_string(), json!(2));

    surql
        .query("SELECT * FROM t WHERE a = $a AND b = $b")
        .vars(first)
        .vars(second)
        .bind("c", "three")
        .execute()
        .await
        .unwrap();

    let vars = &conn.submissions()[0].vars;
    assert_eq!(vars.get("a"), Some(&json!(1)));
    assert_eq!(vars.get("b"), Some(&json!(2)));
    assert_eq!(vars.get("c"), Some(&json!("three")));
}

#[tokio::test]
async fn test_surql_macro_formats_text() {
    let (conn, surql) = recording();
    let ns = "app";
    crate::surql!(surql, "USE NS {ns}; INFO FOR NS;")
        .execute()
        .await
        .unwrap();

    assert_eq!(
        conn.submissions()[0].sql,
        "BEGIN TRANSACTION;\nUSE NS app;\nINFO FOR NS;\nCOMMIT TRANSACTION;"
    );
}

#[derive(Debug, Deserialize, PartialEq)]
struct Row {
    name: String,
}

#[test]
fn test_response_take_decodes() {
    let response = QueryResponse::new(vec![
        Value::Null,
        json!([{ "name": "0000_init" }, { "name": "0001_add_field" }]),
    ]);

    let rows: Vec<Row> = response.expect_statements(2).unwrap().take(1).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].name, "0001_add_field");
}

#[test]
fn test_response_shape_errors() {
    let response = QueryResponse::new(vec![json!("not rows")]);

    assert!(matches!(
        response.expect_statements(2),
        Err(DbError::ResultShape(_))
    ));
    assert!(matches!(response.get(3), Err(DbError::ResultShape(_))));
    assert!(matches!(
        response.take::<Vec<Row>>(0),
        Err(DbError::ResultShape(_))
    ));
}

#[tokio::test]
async fn test_closed_connection_rejects_queries() {
    let (conn, surql) = recording();
    surql.close().await.unwrap();

    assert!(conn.is_closed());
    let err = surql.query("SELECT 1").execute().await.unwrap_err();
    assert!(matches!(err, DbError::Closed(_)));
}
