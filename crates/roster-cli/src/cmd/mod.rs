//! One-shot command handlers and the source selection they share with the
//! TUI.

pub mod cities;
pub mod completions;
pub mod list;

use crate::output::{CliError, OutputMode, render_error};
use roster_core::DirectoryStore;
use roster_core::config::{RosterConfig, resolve_source_url};
use roster_core::source::{DataSource, FileSource, HttpSource};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Where the directory comes from, as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct SourceSelection {
    pub url: Option<String>,
    pub input: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

impl SourceSelection {
    /// Build the data source: `--input` wins, otherwise HTTP against the
    /// resolved URL.
    pub fn build(&self, config: &RosterConfig) -> Box<dyn DataSource> {
        if let Some(path) = &self.input {
            return Box::new(FileSource::new(path));
        }
        let url = resolve_source_url(self.url.as_deref(), config);
        let timeout = self
            .timeout_secs
            .map_or_else(|| config.source.timeout(), Duration::from_secs);
        Box::new(HttpSource::new(url).with_timeout(timeout))
    }
}

/// Load a store for a one-shot command.
///
/// A failed load is rendered through the output layer before the error is
/// returned, so callers only need `?`.
pub fn load_store(source: &dyn DataSource, output: OutputMode) -> anyhow::Result<DirectoryStore> {
    debug!(source = %source.describe(), "loading directory for one-shot command");
    let mut store = DirectoryStore::new();
    let outcome = source.fetch_all();
    let failure = outcome.as_ref().err().map(CliError::from);

    store.begin_load()?;
    store.finish_load(outcome)?;

    if let Some(err) = failure {
        render_error(output, &err)?;
        anyhow::bail!("{}", err.message);
    }
    Ok(store)
}
