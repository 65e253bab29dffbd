//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use sitemgr_core::{CoreError, Site, Snapshot};

use crate::cli::GlobalOpts;
use crate::config::Resolved;
use crate::error::CliError;

/// Run one refresh cycle behind a spinner.
pub async fn fetch_snapshot(resolved: &Resolved, global: &GlobalOpts) -> Result<Snapshot, CliError> {
    let spinner = spinner("Fetching from Site Manager", global);
    let result = resolved.refresher().refresh().await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    Ok(result?)
}

/// Spinner on stderr, only when it is an interactive terminal.
pub fn spinner(message: &str, global: &GlobalOpts) -> Option<ProgressBar> {
    if global.quiet || !std::io::stderr().is_terminal() {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    Some(pb)
}

/// Find a site by id.
pub fn find_site<'a>(snapshot: &'a Snapshot, site_id: &str) -> Result<&'a Site, CliError> {
    snapshot.site(site_id).ok_or_else(|| {
        CoreError::SiteNotFound {
            identifier: site_id.to_owned(),
        }
        .into()
    })
}

/// Render an optional value for a table cell.
pub fn cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
