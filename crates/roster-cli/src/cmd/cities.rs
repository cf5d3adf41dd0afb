//! `roster cities` — the distinct city list, as offered by the TUI picker.

use crate::cmd::{SourceSelection, load_store};
use crate::output::{OutputMode, pretty_section, render};
use roster_core::config::RosterConfig;
use serde::Serialize;
use std::io::{self, Write};

/// Label for records with no city.
const NO_CITY_LABEL: &str = "(no city)";

#[derive(Debug, Serialize)]
pub struct CitiesOutput {
    pub cities: Vec<String>,
}

fn write_cities(out: &mut dyn Write, value: &CitiesOutput, output: OutputMode) -> io::Result<()> {
    if output == OutputMode::Pretty {
        let noun = if value.cities.len() == 1 { "city" } else { "cities" };
        pretty_section(out, &format!("{} {noun}", value.cities.len()))?;
    }
    for city in &value.cities {
        if city.is_empty() {
            writeln!(out, "{NO_CITY_LABEL}")?;
        } else {
            writeln!(out, "{city}")?;
        }
    }
    Ok(())
}

pub fn run_cities(
    sources: &SourceSelection,
    config: &RosterConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let source = sources.build(config);
    let store = load_store(source.as_ref(), output)?;
    let value = CitiesOutput {
        cities: store.cities().to_vec(),
    };
    render(output, &value, |v, w| write_cities(w, v, output))
}
