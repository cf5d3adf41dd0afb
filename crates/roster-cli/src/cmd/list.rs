//! `roster list` — load once, apply filters, print the matching people.

use crate::cmd::{SourceSelection, load_store};
use crate::output::{OutputMode, Renderable, pretty_section, render_list_to};
use clap::Args;
use roster_core::clock::Clock;
use roster_core::config::RosterConfig;
use roster_core::model::person::format_birth_date;
use roster_core::{DirectoryStore, PersonRecord};
use serde::Serialize;
use std::io::{self, Write};
use tracing::debug;

/// Shown instead of rows when the filters match nobody.
pub const EMPTY_RESULT_MESSAGE: &str = "No users found matching your criteria";

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Case-insensitive substring of the first or last name.
    #[arg(short, long)]
    pub name: Option<String>,

    /// Exact city name.
    #[arg(short, long)]
    pub city: Option<String>,

    /// Mark the oldest person of each city.
    #[arg(long)]
    pub highlight_oldest: bool,
}

/// One output row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonRow {
    pub id: u64,
    pub name: String,
    pub city: String,
    /// `DD.MM.YYYY`.
    pub birthday: String,
    pub oldest_in_city: bool,
}

impl PersonRow {
    fn from_record<C: Clock>(
        record: &PersonRecord,
        store: &DirectoryStore<C>,
    ) -> Self {
        Self {
            id: record.id,
            name: record.full_name(),
            city: record.city.clone(),
            birthday: format_birth_date(record.birth_date),
            oldest_in_city: store.is_oldest_in_city(record),
        }
    }
}

impl Renderable for PersonRow {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        let marker = if self.oldest_in_city {
            "  (oldest in city)"
        } else {
            ""
        };
        writeln!(
            w,
            "{:<28} {:<20} {}{marker}",
            self.name, self.city, self.birthday
        )
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer(&mut *w, self).map_err(io::Error::other)?;
        writeln!(w)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}",
            self.id,
            self.name,
            self.city,
            self.birthday,
            if self.oldest_in_city { "oldest" } else { "" }
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["id", "name", "city", "birthday", "mark"]
    }
}

/// Apply the list arguments to a loaded store and collect the rows.
pub fn collect_rows<C: Clock>(
    store: &mut DirectoryStore<C>,
    args: &ListArgs,
) -> Vec<PersonRow> {
    if let Some(name) = &args.name {
        store.search_by_name(name.as_str());
    }
    if let Some(city) = &args.city {
        store.filter_by_city(city.as_str());
    }
    store.flush();
    if args.highlight_oldest {
        store.toggle_highlight_oldest();
    }

    let store: &DirectoryStore<C> = store;
    store
        .filtered_records()
        .iter()
        .map(|record| PersonRow::from_record(record, store))
        .collect()
}

/// Write rows, or the empty-result message, in the requested mode.
pub fn write_rows(out: &mut dyn Write, rows: &[PersonRow], output: OutputMode) -> io::Result<()> {
    if rows.is_empty() && !output.is_json() {
        return writeln!(out, "{EMPTY_RESULT_MESSAGE}");
    }
    if output == OutputMode::Pretty {
        let noun = if rows.len() == 1 { "user" } else { "users" };
        pretty_section(out, &format!("{} {noun}", rows.len()))?;
    }
    render_list_to(out, rows, output)
}

pub fn run_list(
    args: &ListArgs,
    sources: &SourceSelection,
    config: &RosterConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let source = sources.build(config);
    let mut store = load_store(source.as_ref(), output)?;
    let rows = collect_rows(&mut store, args);
    debug!(
        rows = rows.len(),
        total = store.all_records().len(),
        "list rendered"
    );
    store.teardown();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_rows(&mut out, &rows, output)?;
    Ok(())
}
