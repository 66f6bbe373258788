//! sm-core - Core library for surreal-migrate
//!
//! This crate provides the schema snapshot model, the snapshot diff engine,
//! the migration journal and on-disk layout, migration naming, and
//! configuration parsing shared by the other surreal-migrate crates.

pub mod config;
pub mod diff;
pub mod error;
pub mod journal;
pub mod layout;
pub mod naming;
pub mod snapshot;

pub use config::{Authentication, BookkeepingScope, Config};
pub use diff::{diff, diff_preserving, overwrite};
pub use error::{CoreError, CoreResult};
pub use journal::Journal;
pub use layout::MigrationLayout;
pub use naming::MigrationName;
pub use snapshot::{DatabaseSnapshot, Definitions, NamespaceSnapshot, Snapshot, TableSnapshot};
