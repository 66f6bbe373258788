//! sm-db - Database layer for surreal-migrate
//!
//! This crate provides the `Connection` trait with an HTTP implementation
//! for SurrealDB, the lazy transactional query executor, and live schema
//! capture into `sm_core::Snapshot` values.

pub mod connection;
pub mod error;
pub mod http;
pub mod introspect;
pub mod query;
pub mod recording;

pub use connection::{Connection, Vars};
pub use error::{DbError, DbResult};
pub use http::HttpConnection;
pub use introspect::{
    capture_snapshot, database_info, namespace_info, root_info, table_info, DatabaseInfo,
    NamespaceInfo, RootInfo, TableInfo,
};
pub use query::{split_statements, Query, QueryResponse, Surql};
pub use recording::{RecordingConnection, Submission};
