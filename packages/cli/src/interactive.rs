//! Interactive menu, shown when no subcommand is given.
//!
//! Uses `dialoguer` prompts so the common edits don't require remembering
//! ids or JSON shapes.

use std::error::Error;

use dialoguer::{Confirm, Select};
use incident_map_filter_models::FilterKind;
use incident_map_storage::registry;

use crate::commands::{self, Context};

/// Menu entries.
enum Action {
    Show,
    Add,
    Remove,
    Reset,
    Copy,
}

impl Action {
    const ALL: &[Self] = &[Self::Show, Self::Add, Self::Remove, Self::Reset, Self::Copy];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Show => "Show filters",
            Self::Add => "Add a filter",
            Self::Remove => "Remove a filter",
            Self::Reset => "Reset to the default filters",
            Self::Copy => "Copy filters from another view",
        }
    }
}

/// Asks for a filter kind.
///
/// # Errors
///
/// Returns an error if the prompt cannot be shown.
pub fn prompt_kind() -> Result<FilterKind, dialoguer::Error> {
    let labels: Vec<&str> = FilterKind::SUPPORTED
        .iter()
        .map(FilterKind::as_str)
        .collect();
    let idx = Select::new()
        .with_prompt("Filter kind")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(FilterKind::SUPPORTED[idx].clone())
}

/// Runs the menu against `ctx.view`.
///
/// # Errors
///
/// Returns an error if a prompt or the chosen command fails.
pub fn run(ctx: &Context) -> Result<(), Box<dyn Error>> {
    println!("Incident map filters (view '{}')", ctx.view);
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();
    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Action::ALL[idx] {
        Action::Show => commands::show(ctx)?,
        Action::Add => commands::add(ctx, prompt_kind()?, None, &[])?,
        Action::Remove => {
            let tree = commands::show_and_load(ctx)?;
            if tree.filters.is_empty() {
                println!("No filters to remove.");
                return Ok(());
            }
            let labels: Vec<String> = tree
                .filters
                .iter()
                .map(|node| format!("[{}] {}", node.id, node.kind))
                .collect();
            let idx = Select::new()
                .with_prompt("Filter to remove")
                .items(&labels)
                .interact()?;
            commands::remove(ctx, tree.filters[idx].id, &[])?;
        }
        Action::Reset => {
            let confirmed = Confirm::new()
                .with_prompt(format!("Reset every filter of view '{}'?", ctx.view))
                .default(false)
                .interact()?;
            if confirmed {
                commands::reset(ctx)?;
            }
        }
        Action::Copy => {
            let sources: Vec<String> = registry::all_views()
                .into_iter()
                .map(|view| view.name)
                .filter(|name| *name != ctx.view)
                .collect();
            if sources.is_empty() {
                println!("No other views to copy from.");
                return Ok(());
            }
            let idx = Select::new()
                .with_prompt("Copy filters from")
                .items(&sources)
                .default(0)
                .interact()?;
            commands::copy(ctx, &sources[idx], &ctx.view)?;
        }
    }

    Ok(())
}
