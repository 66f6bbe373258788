//! In-process connection that records submissions and answers from a script
//!
//! Used by tests across the workspace to observe exactly what text and
//! variables reach the server without running SurrealDB.

use crate::connection::{Connection, Vars};
use crate::error::{DbError, DbResult};
use crate::query::split_statements;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

type Responder = Box<dyn Fn(&str, &Vars) -> DbResult<Vec<Value>> + Send + Sync>;

/// One request as it reached the connection
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub sql: String,
    pub vars: Vars,
}

/// Connection double driven by a responder closure
pub struct RecordingConnection {
    responder: Responder,
    submissions: Mutex<Vec<Submission>>,
    closed: AtomicBool,
}

impl RecordingConnection {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str, &Vars) -> DbResult<Vec<Value>> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            submissions: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// A connection that answers every statement with `null`
    ///
    /// Like the server, it reports no result for `BEGIN` and `COMMIT`.
    pub fn accepting() -> Self {
        Self::new(|sql, _| Ok(vec![Value::Null; result_count(sql)]))
    }

    /// Everything submitted so far, oldest first
    pub fn submissions(&self) -> Vec<Submission> {
        match self.submissions.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Number of results a server reports for `sql`
pub fn result_count(sql: &str) -> usize {
    split_statements(sql)
        .into_iter()
        .filter(|s| {
            let upper = s.to_ascii_uppercase();
            !(upper.starts_with("BEGIN") || upper.starts_with("COMMIT"))
        })
        .count()
}

#[async_trait]
impl Connection for RecordingConnection {
    async fn query(&self, sql: &str, vars: &Vars) -> DbResult<Vec<Value>> {
        if self.is_closed() {
            return Err(DbError::Closed(self.endpoint().to_string()));
        }
        self.submissions
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))?
            .push(Submission {
                sql: sql.to_string(),
                vars: vars.clone(),
            });
        (self.responder)(sql, vars)
    }

    async fn close(&self) -> DbResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn endpoint(&self) -> &str {
        "memory://recording"
    }
}
