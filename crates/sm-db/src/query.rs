//! Transactional query executor
//!
//! [`Surql::query`] builds a [`Query`] without touching the connection.
//! Nothing is sent until [`Query::execute`] is first awaited; from then on
//! the outcome is cached, so every further `execute` sees the same result
//! (or the same error) without a second round trip.
//!
//! Text holding more than one statement is wrapped in
//! `BEGIN TRANSACTION ... COMMIT TRANSACTION` so it applies atomically.

use crate::connection::{Connection, Vars};
use crate::error::{DbError, DbResult};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Build a [`Query`] from a format string, like `format!`
///
/// ```ignore
/// let info = surql!(surql, "USE NS {ns} DB {db}; INFO FOR DB;");
/// ```
#[macro_export]
macro_rules! surql {
    ($surql:expr, $($fmt:tt)+) => {
        $surql.query(format!($($fmt)+))
    };
}

/// Query factory bound to one connection
#[derive(Clone)]
pub struct Surql {
    conn: Arc<dyn Connection>,
}

impl Surql {
    pub fn new(conn: Arc<dyn Connection>) -> Self {
        Self { conn }
    }

    /// Start a query; it is submitted on first `execute`
    pub fn query(&self, text: impl Into<String>) -> Query {
        Query {
            conn: Arc::clone(&self.conn),
            text: text.into(),
            vars: Vars::new(),
            outcome: OnceCell::new(),
        }
    }

    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.conn
    }

    pub async fn close(&self) -> DbResult<()> {
        self.conn.close().await
    }
}

/// A lazily submitted query
pub struct Query {
    conn: Arc<dyn Connection>,
    text: String,
    vars: Vars,
    outcome: OnceCell<DbResult<QueryResponse>>,
}

impl Query {
    /// Merge `vars` into the bound variables; later keys win
    pub fn vars(mut self, vars: Vars) -> Self {
        self.vars.extend(vars);
        self
    }

    /// Bind a single variable, available as `$key`
    pub fn bind(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn bound_vars(&self) -> &Vars {
        &self.vars
    }

    /// Non-empty, trimmed statements of the query text
    pub fn statements(&self) -> Vec<&str> {
        split_statements(&self.text)
    }

    /// The exact text sent to the server
    pub fn submitted_text(&self) -> String {
        let statements = self.statements();
        if statements.len() <= 1 {
            return self.text.clone();
        }
        let mut wrapped = String::from("BEGIN TRANSACTION;\n");
        for statement in statements {
            wrapped.push_str(statement);
            wrapped.push_str(";\n");
        }
        wrapped.push_str("COMMIT TRANSACTION;");
        wrapped
    }

    /// Whether the query has already been submitted
    pub fn is_executed(&self) -> bool {
        self.outcome.initialized()
    }

    /// Submit on first call, then replay the cached outcome
    pub async fn execute(&self) -> DbResult<&QueryResponse> {
        self.outcome
            .get_or_init(|| self.submit())
            .await
            .as_ref()
            .map_err(Clone::clone)
    }

    async fn submit(&self) -> DbResult<QueryResponse> {
        let sql = self.submitted_text();
        log::debug!("Submitting to {}:\n{}", self.conn.endpoint(), sql);
        let results = self.conn.query(&sql, &self.vars).await?;
        Ok(QueryResponse::new(results))
    }
}

/// Per-statement results of one submission
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResponse {
    results: Vec<Value>,
}

impl QueryResponse {
    pub fn new(results: Vec<Value>) -> Self {
        Self { results }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn results(&self) -> &[Value] {
        &self.results
    }

    /// Check the caller's declared statement count
    pub fn expect_statements(&self, expected: usize) -> DbResult<&Self> {
        if self.results.len() != expected {
            return Err(DbError::ResultShape(format!(
                "expected {expected} statement result(s), got {}",
                self.results.len()
            )));
        }
        Ok(self)
    }

    pub fn get(&self, index: usize) -> DbResult<&Value> {
        self.results.get(index).ok_or_else(|| {
            DbError::ResultShape(format!(
                "no result at index {index} ({} result(s))",
                self.results.len()
            ))
        })
    }

    /// Decode the result of statement `index`
    pub fn take<T: DeserializeOwned>(&self, index: usize) -> DbResult<T> {
        let value = self.get(index)?.clone();
        serde_json::from_value(value)
            .map_err(|e| DbError::ResultShape(format!("result {index}: {e}")))
    }
}

/// Split on top-level `;`, trimming and dropping empty segments
///
/// Semicolons inside quotes, brackets or comments belong to the statement,
/// so `DEFINE FUNCTION` bodies stay whole. `--`, `//`, `#` and `/* */`
/// comments are skipped while scanning; a comment trailing a statement is
/// cut off so that a `;` appended after it still terminates the statement.
pub fn split_statements<'a>(text: &'a str) -> Vec<&'a str> {
    let mut statements = Vec::new();
    let mut push = |segment: &'a str| {
        let trimmed = segment.trim();
        if !trimmed.is_empty() {
            statements.push(trimmed);
        }
    };

    let mut depth = 0usize;
    let mut start = 0;
    // Byte offset just past the last non-comment character of the statement
    let mut code_end = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let next = chars.peek().map(|&(_, n)| n);
        match c {
            '#' => skip_line(&mut chars),
            '-' | '/' if next == Some(c) => skip_line(&mut chars),
            '/' if next == Some('*') => {
                chars.next();
                skip_block_comment(&mut chars);
            }
            ';' if depth == 0 => {
                push(&text[start..code_end]);
                start = i + 1;
                code_end = start;
            }
            _ => {
                match c {
                    '\'' | '"' | '`' => skip_quoted(&mut chars, c),
                    '{' | '(' | '[' => depth += 1,
                    '}' | ')' | ']' => depth = depth.saturating_sub(1),
                    _ => {}
                }
                if !c.is_whitespace() {
                    code_end = chars.peek().map_or(text.len(), |&(j, _)| j);
                }
            }
        }
    }
    push(&text[start..code_end]);

    statements
}

type Scanner<'a> = std::iter::Peekable<std::str::CharIndices<'a>>;

fn skip_quoted(chars: &mut Scanner<'_>, quote: char) {
    let mut escaped = false;
    for (_, c) in chars.by_ref() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return;
        }
    }
}

fn skip_line(chars: &mut Scanner<'_>) {
    for (_, c) in chars.by_ref() {
        if c == '\n' {
            return;
        }
    }
}

fn skip_block_comment(chars: &mut Scanner<'_>) {
    let mut star = false;
    for (_, c) in chars.by_ref() {
        if star && c == '/' {
            return;
        }
        star = c == '*';
    }
}

#[cfg(test)]
#[path = "query_test.rs"]
mod tests;
