//! Subcommand implementations.

use std::error::Error;
use std::path::{Path, PathBuf};

use incident_map_analytics::{
    calculate_bounds, category_counts, incident_stats, monthly_counts, types_by_category,
};
use incident_map_cli_utils::{MultiProgress, items_bar, spinner};
use incident_map_filter::persistence::FilterSlot;
use incident_map_filter::publish::{PublishedState, count_matching};
use incident_map_filter::reducer::{nested_tree, replay as replay_actions};
use incident_map_filter::{CompiledFilters, EvalContext};
use incident_map_filter_models::{FilterAction, FilterKind, FilterNode, FilterTree, NewFilter};
use incident_map_incident_models::{Incident, IncidentDb};
use incident_map_storage::{FileStore, paths, registry};
use serde_json::Value;

/// Settings shared by every command.
pub struct Context {
    /// Root of the data directory.
    pub data_dir: PathBuf,
    /// View whose filter tree is operated on.
    pub view: String,
    /// Progress bar host set up by the logger.
    pub multi: MultiProgress,
}

impl Context {
    fn store(&self) -> FileStore {
        FileStore::new(paths::filters_dir_in(&self.data_dir))
    }
}

/// Parses a kind name, rejecting kinds without an evaluator.
pub fn parse_kind(name: &str) -> Result<FilterKind, Box<dyn Error>> {
    match FilterKind::from(name) {
        FilterKind::Unsupported(name) => {
            let known = FilterKind::SUPPORTED
                .iter()
                .map(FilterKind::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            Err(format!("Unknown filter kind '{name}' (expected one of: {known})").into())
        }
        kind => Ok(kind),
    }
}

/// Parses a JSON state argument.
pub fn parse_state(json: &str) -> Result<Value, Box<dyn Error>> {
    serde_json::from_str(json).map_err(|e| format!("Invalid state JSON: {e}").into())
}

fn describe(node: &FilterNode, depth: usize, out: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    if node.kind.is_container() {
        out.push(format!("{indent}[{}] {}", node.id, node.kind));
        for child in &nested_tree(node).filters {
            describe(child, depth + 1, out);
        }
        return;
    }
    let state = node
        .state
        .as_ref()
        .map_or_else(|| "(unconfigured)".to_string(), Value::to_string);
    out.push(format!("{indent}[{}] {} {state}", node.id, node.kind));
}

fn print_tree(view: &str, tree: &FilterTree) {
    println!("View '{view}' (next id {}):", tree.index);
    let mut lines = Vec::new();
    for node in &tree.filters {
        describe(node, 1, &mut lines);
    }
    for line in lines {
        println!("{line}");
    }
}

fn load_tree(ctx: &Context) -> Result<FilterTree, Box<dyn Error>> {
    let mut store = ctx.store();
    Ok(FilterSlot::for_view(&mut store, &ctx.view)?.load()?)
}

fn dispatch(ctx: &Context, path: &[u32], action: &FilterAction) -> Result<(), Box<dyn Error>> {
    let mut store = ctx.store();
    let tree = FilterSlot::for_view(&mut store, &ctx.view)?.dispatch_at_path(path, action)?;
    print_tree(&ctx.view, &tree);
    Ok(())
}

/// Prints the view's tree.
pub fn show(ctx: &Context) -> Result<(), Box<dyn Error>> {
    show_and_load(ctx).map(|_| ())
}

/// Prints the view's tree and returns it.
pub fn show_and_load(ctx: &Context) -> Result<FilterTree, Box<dyn Error>> {
    let tree = load_tree(ctx)?;
    print_tree(&ctx.view, &tree);
    Ok(tree)
}

/// Lists the registered views.
pub fn views() {
    for view in registry::all_views() {
        println!("{:<10} {:<20} {}", view.name, view.key, view.description);
    }
}

/// Restores the default tree.
pub fn reset(ctx: &Context) -> Result<(), Box<dyn Error>> {
    let mut store = ctx.store();
    let tree = FilterSlot::for_view(&mut store, &ctx.view)?.reset()?;
    log::info!("Reset filters of view '{}'", ctx.view);
    print_tree(&ctx.view, &tree);
    Ok(())
}

/// Adds a node of `kind` inside the container at `path`.
pub fn add(
    ctx: &Context,
    kind: FilterKind,
    state: Option<Value>,
    path: &[u32],
) -> Result<(), Box<dyn Error>> {
    dispatch(ctx, path, &FilterAction::AddFilter(NewFilter { kind, state }))
}

/// Removes node `id` from the container at `path`.
pub fn remove(ctx: &Context, id: u32, path: &[u32]) -> Result<(), Box<dyn Error>> {
    dispatch(ctx, path, &FilterAction::remove(id))
}

/// Replaces the state of node `id` in the container at `path`.
pub fn update(ctx: &Context, id: u32, state: Value, path: &[u32]) -> Result<(), Box<dyn Error>> {
    dispatch(ctx, path, &FilterAction::update_state(id, state))
}

/// Copies the tree of view `from` into view `to`.
pub fn copy(ctx: &Context, from: &str, to: &str) -> Result<(), Box<dyn Error>> {
    let source_key = registry::view(from)?.key;
    let mut store = ctx.store();
    let tree = FilterSlot::for_view(&mut store, to)?.copy_from(&source_key)?;
    print_tree(to, &tree);
    Ok(())
}

/// Applies a recorded action log.
pub fn replay(ctx: &Context, file: &Path) -> Result<(), Box<dyn Error>> {
    let contents = std::fs::read_to_string(file)
        .map_err(|e| format!("Failed to read {}: {e}", file.display()))?;
    let actions: Vec<FilterAction> = serde_json::from_str(&contents)?;

    let mut store = ctx.store();
    let mut slot = FilterSlot::for_view(&mut store, &ctx.view)?;
    let tree = replay_actions(&slot.load()?, &actions);
    slot.save(&tree)?;

    log::info!("Replayed {} action(s) on view '{}'", actions.len(), ctx.view);
    print_tree(&ctx.view, &tree);
    Ok(())
}

fn load_db(multi: &MultiProgress, path: &Path) -> Result<IncidentDb, Box<dyn Error>> {
    let spin = spinner(multi, &format!("Reading {}", path.display()));
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let db: IncidentDb = serde_json::from_str(&contents)?;
    spin.finish_and_clear();

    log::info!(
        "Loaded {} incidents, {} types, {} categories from {}",
        db.incidents.len(),
        db.types.len(),
        db.categories.len(),
        path.display()
    );
    Ok(db)
}

/// Prints how many live incidents pass the view's filters.
pub fn count(ctx: &Context, data: &Path) -> Result<(), Box<dyn Error>> {
    let tree = load_tree(ctx)?;
    let db = load_db(&ctx.multi, data)?.without_deleted();
    let matching = count_matching(&db, &tree.filters);
    println!("{matching}/{}", db.incidents.len());
    Ok(())
}

/// Writes both publish snapshots and prints the report.
pub fn publish(
    ctx: &Context,
    data: &Path,
    out: Option<PathBuf>,
    prune: bool,
) -> Result<(), Box<dyn Error>> {
    let mut store = ctx.store();
    let tree = FilterSlot::for_view(&mut store, &ctx.view)?.load()?;
    let db = load_db(&ctx.multi, data)?;

    let spin = spinner(&ctx.multi, "Publishing");
    let published = PublishedState::build(&db, &tree.filters, chrono::Utc::now());
    let out = out.unwrap_or_else(|| paths::published_dir_in(&ctx.data_dir));
    let written = published.write(&out)?;
    spin.finish_and_clear();

    for path in &written {
        log::info!("Published {}", path.display());
    }

    if prune && !published.report.removed.is_empty() {
        let pruned = serde_json::to_string_pretty(&db.without_deleted())?;
        let tmp = data.with_extension("json.tmp");
        std::fs::write(&tmp, pruned)?;
        std::fs::rename(&tmp, data)?;
        log::info!(
            "Pruned {} soft-deleted document(s) from {}",
            published.report.removed.len(),
            data.display()
        );
    }

    println!("{}", serde_json::to_string_pretty(&published.report)?);
    Ok(())
}

/// Prints bounds, headline numbers, per-category counts and the monthly
/// series of the incidents that pass the view's filters.
pub fn stats(ctx: &Context, data: &Path) -> Result<(), Box<dyn Error>> {
    let tree = load_tree(ctx)?;
    let db = load_db(&ctx.multi, data)?.without_deleted();
    let eval = EvalContext::new(&db);
    let compiled = CompiledFilters::compile(&tree.filters);

    let bar = items_bar(&ctx.multi, "Filtering", db.incidents.len() as u64);
    let matching: Vec<&Incident> = db
        .incidents
        .values()
        .filter(|incident| {
            bar.inc(1);
            compiled.passes(incident, &eval)
        })
        .collect();
    bar.finish_and_clear();

    let summary = serde_json::json!({
        "view": ctx.view,
        "matching": matching.len(),
        "bounds": calculate_bounds(db.incidents.values()),
        "stats": incident_stats(&db.types, matching.iter().copied()),
        "categories": category_counts(&db, matching.iter().copied()),
        "monthly": monthly_counts(matching.iter().copied()),
        "typesByCategory": types_by_category(&db),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
