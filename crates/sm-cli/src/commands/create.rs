//! Create command implementation - diff the live schema into a migration

use anyhow::{Context, Result};
use sm_core::naming::random_name;
use sm_ledger::{create_custom_migration, create_migration, plan_pending};

use crate::cli::{CreateArgs, GlobalArgs};
use crate::commands::common::{load_project, with_connection};

/// Execute the create command
pub(crate) async fn execute(args: &CreateArgs, global: &GlobalArgs) -> Result<()> {
    let (config, layout) = load_project(global)?;
    layout.require_initialized()?;

    let label = args.name.clone().unwrap_or_else(random_name);

    if args.custom {
        let name = create_custom_migration(&layout, &label)
            .context("Failed to create custom migration")?;
        println!(
            "custom migration {name} created at {}",
            layout.script_path(name.as_str()).display()
        );
        return Ok(());
    }

    let scope = config.scope();
    let (layout, scope) = (&layout, &scope);

    if args.dry_run {
        let plan = with_connection(&config, |surql| async move {
            Ok(plan_pending(&surql, layout, scope).await?)
        })
        .await?;
        match plan {
            Some(plan) => {
                println!("-- up");
                for statement in &plan.up {
                    println!("{statement};");
                }
                println!("-- down");
                for statement in &plan.down {
                    println!("{statement};");
                }
            }
            None => println!("no changes detected"),
        }
        return Ok(());
    }

    let created = with_connection(&config, |surql| async move {
        Ok(create_migration(&surql, layout, scope, &label).await?)
    })
    .await
    .context("Failed to create migration")?;

    match created {
        Some(created) => println!(
            "migration {} created ({} statement(s))",
            created.name,
            created.plan.up.len()
        ),
        None => println!("no changes detected"),
    }
    Ok(())
}
