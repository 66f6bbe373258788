//! Connection trait definition

use crate::error::DbResult;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Named variables bound to a query, referenced as `$name` in SurrealQL
pub type Vars = Map<String, Value>;

/// An open session against a SurrealDB endpoint
///
/// Implementations must be Send + Sync for async operation.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Submit `sql` as one request and return one result per statement
    ///
    /// A statement rejected by the server surfaces as
    /// [`DbError::StatementFailed`](crate::DbError::StatementFailed).
    async fn query(&self, sql: &str, vars: &Vars) -> DbResult<Vec<Value>>;

    /// Release the session; later queries fail with `Closed`
    async fn close(&self) -> DbResult<()>;

    /// Endpoint identifier for logging
    fn endpoint(&self) -> &str;
}
