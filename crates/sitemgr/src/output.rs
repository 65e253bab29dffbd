//! Rendering for every `--output` mode.
//!
//! A [`Printer`] is built once per command from the global flags. Lists go
//! through a `Tabled` row type in table mode and straight through serde
//! otherwise; `plain` prints one identifier per line for scripts.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};

/// Output settings resolved from the global flags.
#[derive(Debug, Clone)]
pub struct Printer {
    format: OutputFormat,
    color: bool,
    quiet: bool,
}

impl Printer {
    pub fn new(global: &GlobalOpts) -> Self {
        Self {
            format: global.output.clone(),
            color: color_enabled(&global.color),
            quiet: global.quiet,
        }
    }

    pub fn format(&self) -> &OutputFormat {
        &self.format
    }

    /// Print a collection. `to_row` feeds the table, `id_fn` the plain mode.
    pub fn list<T, R>(&self, data: &[T], to_row: impl Fn(&T) -> R, id_fn: impl Fn(&T) -> String)
    where
        T: Serialize,
        R: Tabled,
    {
        let text = match self.format {
            OutputFormat::Table => {
                let rows: Vec<R> = data.iter().map(to_row).collect();
                Table::new(rows).with(Style::rounded()).to_string()
            }
            OutputFormat::Plain => data.iter().map(id_fn).collect::<Vec<_>>().join("\n"),
            _ => self.structured(data),
        };
        self.line(&text);
    }

    /// Print one item. Table mode uses `detail_fn` instead of a row type.
    pub fn single<T: Serialize>(
        &self,
        data: &T,
        detail_fn: impl Fn(&T) -> String,
        id_fn: impl Fn(&T) -> String,
    ) {
        let text = match self.format {
            OutputFormat::Table => detail_fn(data),
            OutputFormat::Plain => id_fn(data),
            _ => self.structured(data),
        };
        self.line(&text);
    }

    /// Serialize for the JSON/YAML modes. Table and plain get compact JSON.
    pub fn structured<T: Serialize + ?Sized>(&self, data: &T) -> String {
        let result = match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(data).map_err(|e| e.to_string()),
            OutputFormat::Yaml => serde_yaml::to_string(data)
                .map(|s| s.trim_end().to_owned())
                .map_err(|e| e.to_string()),
            _ => serde_json::to_string(data).map_err(|e| e.to_string()),
        };
        result.unwrap_or_else(|e| format!("serialization failed: {e}"))
    }

    /// Write one block to stdout unless `--quiet`.
    pub fn line(&self, text: &str) {
        if self.quiet || text.is_empty() {
            return;
        }
        let _ = writeln!(io::stdout().lock(), "{text}");
    }

    /// Color an entity state for table cells.
    pub fn state(&self, state: &str) -> String {
        paint_state(state, self.color)
    }
}

fn color_enabled(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

fn paint_state(state: &str, color: bool) -> String {
    if !color {
        return state.to_owned();
    }
    match state {
        "online" | "ok" | "connected" => state.green().to_string(),
        "offline" | "error" | "failed" => state.red().to_string(),
        "unknown" => state.dimmed().to_string(),
        _ => state.yellow().to_string(),
    }
}

/// Align `(label, value)` pairs into a two-column block.
pub fn detail(pairs: &[(&str, String)]) -> String {
    let width = pairs.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    pairs
        .iter()
        .map(|(k, v)| format!("{k:<width$}  {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn printer(format: OutputFormat) -> Printer {
        Printer {
            format,
            color: false,
            quiet: false,
        }
    }

    #[test]
    fn detail_block_aligns_labels() {
        let out = detail(&[("id", "S1".into()), ("state", "online".into())]);
        assert_eq!(out, "id     S1\nstate  online");
    }

    #[test]
    fn uncolored_state_is_verbatim() {
        assert_eq!(printer(OutputFormat::Table).state("online"), "online");
        assert_eq!(paint_state("pending", false), "pending");
    }

    #[test]
    fn structured_modes() {
        #[derive(Serialize)]
        struct Point {
            id: &'static str,
        }
        let p = Point { id: "S1" };
        assert_eq!(printer(OutputFormat::JsonCompact).structured(&p), r#"{"id":"S1"}"#);
        assert_eq!(printer(OutputFormat::Plain).structured(&p), r#"{"id":"S1"}"#);
        assert_eq!(printer(OutputFormat::Yaml).structured(&p), "id: S1");
        assert!(printer(OutputFormat::Json).structured(&p).contains("\n"));
    }
}
