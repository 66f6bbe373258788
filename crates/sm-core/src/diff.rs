//! Snapshot diff engine.
//!
//! [`diff`] compares two schema trees and produces the ordered statements
//! that turn a system in the `previous` state into the `current` state.
//! Swapping the arguments produces the inverse, which is how rollback
//! scripts are generated.
//!
//! Per level the rule is the same:
//! - present in `current` and absent or different in `previous`: the
//!   definition, rewritten to `DEFINE <KIND> OVERWRITE ...`
//! - present only in `previous`: `REMOVE <KIND> <name>`
//! - identical: nothing
//!
//! Statements are grouped by scope. `USE NS` / `USE DB` is emitted in front
//! of a namespace or database only when that scope produced at least one
//! statement, so unchanged branches never show up in a migration.
//!
//! Definitions are opaque strings; the only rewrite is [`overwrite`].

use crate::snapshot::{DatabaseSnapshot, Definitions, Snapshot, TableSnapshot};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

static DEFINE_CLAUSE: OnceLock<Regex> = OnceLock::new();

fn define_clause() -> &'static Regex {
    DEFINE_CLAUSE.get_or_init(|| {
        Regex::new(r"^DEFINE (\S+) (OVERWRITE |IF NOT EXISTS )?").expect("valid regex")
    })
}

/// Rewrite `DEFINE <KIND> <rest>` into `DEFINE <KIND> OVERWRITE <rest>`.
///
/// `IF NOT EXISTS` is replaced, an existing `OVERWRITE` is kept, and
/// anything that is not a `DEFINE` statement is returned unchanged.
pub fn overwrite(definition: &str) -> String {
    let Some(caps) = define_clause().captures(definition) else {
        return definition.to_string();
    };
    if caps.get(2).is_some_and(|m| m.as_str() == "OVERWRITE ") {
        return definition.to_string();
    }
    let rest = &definition[caps.get(0).map_or(0, |m| m.end())..];
    format!("DEFINE {} OVERWRITE {rest}", &caps[1])
}

/// Statements transforming `previous` into `current`.
///
/// Namespaces are visited in key order; inside a namespace: its own
/// definition, each database scope, then removed databases. Removed
/// namespaces come last.
pub fn diff(current: &Snapshot, previous: &Snapshot) -> Vec<String> {
    diff_preserving(current, previous, None)
}

/// Like [`diff`], except that namespace `preserved` is never removed.
///
/// When it disappears from `current`, its databases are removed one by one
/// instead, leaving whatever else lives in it untouched.
pub fn diff_preserving(
    current: &Snapshot,
    previous: &Snapshot,
    preserved: Option<&str>,
) -> Vec<String> {
    let mut statements = Vec::new();
    let no_databases = BTreeMap::new();

    for (ns_name, namespace) in current.namespaces() {
        let previous_ns = previous.namespaces().get(ns_name);
        let mut scope = Vec::new();

        if previous_ns.map(|ns| &ns.create) != Some(&namespace.create) {
            scope.push(overwrite(&namespace.create));
        }

        let previous_dbs = previous_ns.map_or(&no_databases, |ns| &ns.databases);
        for (db_name, database) in &namespace.databases {
            let db_statements = diff_database(database, previous_dbs.get(db_name));
            if !db_statements.is_empty() {
                scope.push(format!("USE DB {db_name}"));
                scope.extend(db_statements);
            }
        }

        for name in removed(previous_dbs, &namespace.databases) {
            scope.push(format!("REMOVE DATABASE {name}"));
        }

        if !scope.is_empty() {
            statements.push(format!("USE NS {ns_name}"));
            statements.extend(scope);
        }
    }

    for name in removed(previous.namespaces(), current.namespaces()) {
        match previous.namespaces().get(name) {
            Some(namespace) if preserved == Some(name) => {
                if !namespace.databases.is_empty() {
                    statements.push(format!("USE NS {name}"));
                    for db_name in namespace.databases.keys() {
                        statements.push(format!("REMOVE DATABASE {db_name}"));
                    }
                }
            }
            _ => statements.push(format!("REMOVE NAMESPACE {name}")),
        }
    }

    statements
}

/// Statements inside one database scope, without the `USE DB` line.
fn diff_database(current: &DatabaseSnapshot, previous: Option<&DatabaseSnapshot>) -> Vec<String> {
    let mut out = Vec::new();
    let none = Definitions::new();
    let no_tables = BTreeMap::new();

    if previous.map(|db| &db.create) != Some(&current.create) {
        out.push(overwrite(&current.create));
    }

    compare(
        &mut out,
        &current.analyzers,
        previous.map_or(&none, |db| &db.analyzers),
        |name| format!("REMOVE ANALYZER {name}"),
    );
    compare(
        &mut out,
        &current.functions,
        previous.map_or(&none, |db| &db.functions),
        |name| format!("REMOVE FUNCTION {name}"),
    );
    compare(
        &mut out,
        &current.params,
        previous.map_or(&none, |db| &db.params),
        |name| format!("REMOVE PARAM {name}"),
    );

    let previous_tables = previous.map_or(&no_tables, |db| &db.tables);
    for (table_name, table) in &current.tables {
        diff_table(&mut out, table_name, table, previous_tables.get(table_name));
    }
    for name in removed(previous_tables, &current.tables) {
        out.push(format!("REMOVE TABLE {name}"));
    }

    out
}

fn diff_table(
    out: &mut Vec<String>,
    table_name: &str,
    current: &TableSnapshot,
    previous: Option<&TableSnapshot>,
) {
    let none = Definitions::new();

    if previous.map(|t| &t.create) != Some(&current.create) {
        out.push(overwrite(&current.create));
    }

    compare(
        out,
        &current.events,
        previous.map_or(&none, |t| &t.events),
        |name| format!("REMOVE EVENT {name} ON TABLE {table_name}"),
    );
    compare(
        out,
        &current.fields,
        previous.map_or(&none, |t| &t.fields),
        |name| format!("REMOVE FIELD {name} ON TABLE {table_name}"),
    );
    compare(
        out,
        &current.indexes,
        previous.map_or(&none, |t| &t.indexes),
        |name| format!("REMOVE INDEX {name} ON TABLE {table_name}"),
    );
}

/// Flat map comparison shared by every leaf kind.
fn compare(
    out: &mut Vec<String>,
    current: &Definitions,
    previous: &Definitions,
    remove: impl Fn(&str) -> String,
) {
    for (name, definition) in current {
        if previous.get(name) != Some(definition) {
            out.push(overwrite(definition));
        }
    }
    for name in removed(previous, current) {
        out.push(remove(name));
    }
}

/// Keys of `previous` that are missing from `current`, in key order.
fn removed<'a, V, W>(
    previous: &'a BTreeMap<String, V>,
    current: &'a BTreeMap<String, W>,
) -> impl Iterator<Item = &'a str> {
    previous
        .keys()
        .filter(|name| !current.contains_key(*name))
        .map(String::as_str)
}

#[cfg(test)]
#[path = "diff_test.rs"]
mod tests;
