//! Entity projection command handler.

use chrono::Utc;
use tabled::Tabled;

use sitemgr_core::{Entity, project};

use crate::cli::{EntitiesArgs, GlobalOpts};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output::Printer;

use super::util;

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "Unique ID")]
    unique_id: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
}

fn entity_row(e: &Entity, out: &Printer) -> EntityRow {
    EntityRow {
        unique_id: e.unique_id(),
        kind: e.kind.to_string(),
        name: e.name.clone(),
        state: out.state(&e.state),
    }
}

pub async fn handle(resolved: &Resolved, args: &EntitiesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = util::fetch_snapshot(resolved, global).await?;
    let set = project(&snapshot, &resolved.coordinator.projection, Utc::now());

    let entities: Vec<Entity> = set
        .entities()
        .filter(|e| args.kind.as_deref().is_none_or(|k| e.kind.to_string() == k))
        .cloned()
        .collect();

    let out = Printer::new(global);
    out.list(&entities, |e| entity_row(e, &out), Entity::unique_id);
    Ok(())
}
