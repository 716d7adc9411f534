pub mod calendar;
pub mod tasks;
pub mod water;

use std::fs;
use std::path::Path;

use anyhow::{Context, bail};
use plantcare_shared::Plant;
use plantcare_shared::date::{parse_date, today};
use serde::Serialize;
use serde_json::Value;
use time::Date;

use crate::config::Config;

/// Reads the JSON array of plants the storage service hands over.
pub fn load_plants(path: &Path) -> anyhow::Result<Vec<Plant>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read plants from {}", path.display()))?;
    let plants: Vec<Plant> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of plants", path.display()))?;

    tracing::debug!(count = plants.len(), path = %path.display(), "loaded plants");

    Ok(plants)
}

/// Reads the plant file as raw JSON records, for edits that must leave every
/// other value exactly as stored.
pub fn load_records(path: &Path) -> anyhow::Result<Vec<Value>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read plants from {}", path.display()))?;

    serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of plants", path.display()))
}

/// Rewrites the plant file, replacing it only once the new content is on disk.
pub fn save_plants<T: Serialize>(path: &Path, plants: &[T]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(plants)?;
    let staging = path.with_extension("json.tmp");

    fs::write(&staging, json)
        .with_context(|| format!("failed to write {}", staging.display()))?;
    fs::rename(&staging, path)
        .with_context(|| format!("failed to replace {}", path.display()))?;

    Ok(())
}

/// `--today` when given, otherwise the current day in the configured timezone.
pub fn resolve_today(value: Option<&str>, config: &Config) -> anyhow::Result<Date> {
    match value {
        Some(value) => match parse_date(value) {
            Some(date) => Ok(date),
            None => bail!("invalid date '{value}', expected YYYY-MM-DD"),
        },
        None => Ok(today(&config.schedule.timezone)),
    }
}

fn display_name(plant_id: &str, nickname: &str) -> String {
    if nickname.is_empty() {
        plant_id.to_string()
    } else {
        nickname.to_string()
    }
}
