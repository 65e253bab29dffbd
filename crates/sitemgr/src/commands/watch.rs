//! Periodic polling: drives a `Coordinator` and reports each cycle.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use sitemgr_core::{Coordinator, CoreError, EntityRegistry, MemoryRegistry, RefreshStatus};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::config::{self, Resolved};
use crate::error::CliError;
use crate::output::Printer;

/// One line of `watch` output.
#[derive(Debug, Serialize)]
struct CycleReport {
    cycle: u64,
    attempted_at: Option<DateTime<Utc>>,
    success: bool,
    error: Option<String>,
    entities: usize,
    registered: usize,
}

impl CycleReport {
    fn new(status: &RefreshStatus, coordinator: &Coordinator, registry: &MemoryRegistry) -> Self {
        Self {
            cycle: status.cycles,
            attempted_at: status.last_attempt_at,
            success: status.last_update_success,
            error: status.last_error.clone(),
            entities: coordinator.entities().map_or(0, |e| e.len()),
            registered: registry.len(),
        }
    }

    fn render(&self, out: &Printer) -> String {
        match out.format() {
            OutputFormat::Table | OutputFormat::Plain => {}
            // One JSON document per line
            OutputFormat::Json | OutputFormat::JsonCompact => {
                return serde_json::to_string(self)
                    .unwrap_or_else(|e| format!("serialization failed: {e}"));
            }
            OutputFormat::Yaml => return format!("---\n{}", out.structured(self)),
        }
        let at = self
            .attempted_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        let outcome = out.state(if self.success { "ok" } else { "failed" });
        let mut line = format!(
            "#{} {at} {outcome} entities={} registered={}",
            self.cycle, self.entities, self.registered
        );
        if let Some(err) = &self.error {
            line.push_str(&format!(" error=\"{err}\""));
        }
        line
    }
}

pub async fn handle(resolved: Resolved, args: &WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let resolved = config::with_interval(resolved, args.interval)?;
    let refresher = resolved.refresher();
    let registry = Arc::new(MemoryRegistry::new());
    let coordinator = Coordinator::new(
        refresher,
        resolved.coordinator,
        Some(Arc::clone(&registry) as Arc<dyn EntityRegistry>),
    );
    let out = Printer::new(global);
    let mut updates = coordinator.updates();

    if !global.quiet {
        eprintln!(
            "Polling every {}s (Ctrl-C to stop)",
            coordinator.config().interval.as_secs()
        );
    }

    // First cycle runs immediately; the task's first tick is one interval out.
    match coordinator.refresh().await {
        Err(e @ CoreError::AuthenticationFailed { .. }) => return Err(e.into()),
        Err(e) => tracing::warn!(error = %e, "initial refresh failed"),
        Ok(_) => {}
    }
    let mut seen = report(&coordinator, &registry, &out);
    coordinator.start().await?;

    let result = loop {
        if args.count.is_some_and(|n| seen >= n) {
            break Ok(());
        }
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break Ok(()),
            status = updates.changed() => {
                let Some(status) = status else { break Ok(()) };
                if status.reauth_required {
                    report(&coordinator, &registry, &out);
                    break Err(CliError::AuthFailed { profile: resolved.profile_name.clone() });
                }
                if status.cycles > seen {
                    seen = report(&coordinator, &registry, &out);
                }
            }
        }
    };

    coordinator.shutdown().await;
    result
}

/// Register the current entities and print the latest cycle. Returns the
/// cycle number reported.
fn report(coordinator: &Coordinator, registry: &MemoryRegistry, out: &Printer) -> u64 {
    if let Some(entities) = coordinator.entities() {
        registry.register_all(&entities);
    }
    let status = coordinator.status();
    out.line(&CycleReport::new(&status, coordinator, registry).render(out));
    status.cycles
}
