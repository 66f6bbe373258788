//! Migration units and where they come from
//!
//! A migration unit is a named pair of procedures, `up` and `down`, run
//! against a [`MigrationContext`]. On disk a unit is a `.surql` script:
//!
//! ```text
//! -- migrate:up
//! USE NS app;
//! DEFINE NAMESPACE OVERWRITE app;
//! -- migrate:down
//! REMOVE NAMESPACE app;
//! ```
//!
//! Each section is submitted as one query, so a multi-statement section runs
//! inside a single transaction.

use crate::error::{LedgerError, LedgerResult};
use async_trait::async_trait;
use sm_core::{MigrationLayout, MigrationName};
use sm_db::{split_statements, DbResult, Surql};

pub const UP_MARKER: &str = "-- migrate:up";
pub const DOWN_MARKER: &str = "-- migrate:down";

/// What a migration procedure gets to work with
pub struct MigrationContext<'a> {
    surql: &'a Surql,
}

impl<'a> MigrationContext<'a> {
    pub fn new(surql: &'a Surql) -> Self {
        Self { surql }
    }

    pub fn surql(&self) -> &'a Surql {
        self.surql
    }
}

/// A named pair of up/down procedures
#[async_trait]
pub trait Migration: Send + Sync {
    fn name(&self) -> &str;

    async fn up(&self, ctx: &MigrationContext<'_>) -> DbResult<()>;

    async fn down(&self, ctx: &MigrationContext<'_>) -> DbResult<()>;
}

/// Loads migration units by journal name
pub trait MigrationSource: Send + Sync {
    fn load(&self, name: &MigrationName) -> LedgerResult<Box<dyn Migration>>;
}

/// A migration parsed from a `.surql` script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptMigration {
    name: MigrationName,
    up: String,
    down: String,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Up,
    Down,
}

impl ScriptMigration {
    /// Parse script text into its up and down sections
    ///
    /// The up marker is required; the down marker is optional. Full-line
    /// `--` comments are dropped, and only comments or blank lines may
    /// precede the first marker.
    pub fn parse(name: MigrationName, text: &str) -> LedgerResult<Self> {
        let invalid = |reason: String| LedgerError::InvalidMigration {
            name: name.to_string(),
            reason,
        };

        let mut section = Section::Preamble;
        let mut up: Option<Vec<&str>> = None;
        let mut down: Option<Vec<&str>> = None;

        for (lineno, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed == UP_MARKER {
                if up.is_some() {
                    return Err(invalid(format!("duplicate '{UP_MARKER}' on line {}", lineno + 1)));
                }
                up = Some(Vec::new());
                section = Section::Up;
                continue;
            }
            if trimmed == DOWN_MARKER {
                if down.is_some() {
                    return Err(invalid(format!(
                        "duplicate '{DOWN_MARKER}' on line {}",
                        lineno + 1
                    )));
                }
                down = Some(Vec::new());
                section = Section::Down;
                continue;
            }
            if trimmed.is_empty() || trimmed.starts_with("--") {
                continue;
            }
            match section {
                Section::Preamble => {
                    return Err(invalid(format!(
                        "statement before '{UP_MARKER}' on line {}",
                        lineno + 1
                    )))
                }
                Section::Up => up.get_or_insert_with(Vec::new).push(line),
                Section::Down => down.get_or_insert_with(Vec::new).push(line),
            }
        }

        let Some(up) = up else {
            return Err(invalid(format!("missing '{UP_MARKER}' section")));
        };

        Ok(Self {
            name,
            up: up.join("\n"),
            down: down.unwrap_or_default().join("\n"),
        })
    }

    pub fn up_text(&self) -> &str {
        &self.up
    }

    pub fn down_text(&self) -> &str {
        &self.down
    }
}

#[async_trait]
impl Migration for ScriptMigration {
    fn name(&self) -> &str {
        self.name.as_str()
    }

    async fn up(&self, ctx: &MigrationContext<'_>) -> DbResult<()> {
        run_section(ctx, &self.up).await
    }

    async fn down(&self, ctx: &MigrationContext<'_>) -> DbResult<()> {
        run_section(ctx, &self.down).await
    }
}

/// Submit a script section; an empty section does nothing
async fn run_section(ctx: &MigrationContext<'_>, text: &str) -> DbResult<()> {
    if split_statements(text).is_empty() {
        return Ok(());
    }
    ctx.surql().query(text).execute().await?;
    Ok(())
}

/// Script files under a migration layout
pub struct ScriptDirectory {
    layout: MigrationLayout,
}

impl ScriptDirectory {
    pub fn new(layout: MigrationLayout) -> Self {
        Self { layout }
    }
}

impl MigrationSource for ScriptDirectory {
    fn load(&self, name: &MigrationName) -> LedgerResult<Box<dyn Migration>> {
        let path = self.layout.script_path(name.as_str());
        let text = std::fs::read_to_string(&path).map_err(|e| LedgerError::InvalidMigration {
            name: name.to_string(),
            reason: format!("cannot read {}: {e}", path.display()),
        })?;
        Ok(Box::new(ScriptMigration::parse(name.clone(), &text)?))
    }
}

/// Render statements into the two-section script format
pub fn render_script(up: &[String], down: &[String]) -> String {
    let mut out = String::new();
    for (marker, statements) in [(UP_MARKER, up), (DOWN_MARKER, down)] {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(marker);
        out.push('\n');
        for statement in statements {
            out.push_str(statement);
            out.push_str(";\n");
        }
    }
    out
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
