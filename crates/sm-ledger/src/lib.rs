//! sm-ledger - Migration ledger for surreal-migrate
//!
//! Keeps the bookkeeping table healthy, turns schema changes into migration
//! scripts, and applies pending scripts exactly once in journal order.

pub mod apply;
pub mod create;
pub mod error;
pub mod migration;
pub mod setup;
pub mod status;

pub use apply::{apply_pending, applied_migrations, ApplyReport};
pub use create::{
    create_custom_migration, create_migration, plan_migration, plan_pending, CreatedMigration,
    MigrationPlan,
};
pub use error::{LedgerError, LedgerResult};
pub use migration::{Migration, MigrationContext, MigrationSource, ScriptDirectory, ScriptMigration};
pub use setup::{ensure_layout, ensure_ledger, LedgerSetup};
pub use status::{status, MigrationState, MigrationStatus};
