use std::fmt::Write as _;
use std::path::Path;

use plantcare_schedule::{Task, TaskSummary, summarize};
use plantcare_shared::DateKey;

use super::{display_name, load_plants, resolve_today};
use crate::config::Config;

pub fn list(
    config: Config,
    plants_path: &Path,
    today: Option<String>,
    window: Option<u32>,
) -> anyhow::Result<()> {
    let today = resolve_today(today.as_deref(), &config)?;
    let plants = load_plants(plants_path)?;
    let window = window.unwrap_or(config.schedule.due_soon_days);

    let summary = summarize(&plants, today, window, &config.schedule.urgency);

    tracing::info!(
        today = %DateKey::from(today),
        overdue = summary.overdue.len(),
        due_today = summary.due_today.len(),
        "checked watering tasks"
    );
    print!("{}", render(&summary, window));

    Ok(())
}

fn task_line(task: &Task<'_>) -> String {
    let name = display_name(&task.plant.plant_id, &task.plant.nickname);
    let urgency = task
        .urgency
        .map(|urgency| urgency.to_string())
        .unwrap_or_default();

    match task.days_overdue {
        0 => format!("  {name}  {urgency}"),
        1 => format!("  {name}  1 day late  {urgency}"),
        days if days > 1 => format!("  {name}  {days} days late  {urgency}"),
        _ => format!("  {name}  {}", DateKey::from(task.due)),
    }
}

pub fn render(summary: &TaskSummary<'_>, window: u32) -> String {
    let mut out = String::new();

    if !summary.needs_attention() && summary.due_soon.is_empty() {
        let _ = writeln!(out, "Nothing to water.");
        return out;
    }

    let sections = [
        ("Overdue", &summary.overdue),
        ("Due today", &summary.due_today),
    ];
    for (title, tasks) in sections {
        if tasks.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{title}:");
        for task in tasks {
            let _ = writeln!(out, "{}", task_line(task));
        }
    }

    if !summary.due_soon.is_empty() {
        let _ = writeln!(out, "Due in the next {window} days:");
        for task in &summary.due_soon {
            let _ = writeln!(out, "{}", task_line(task));
        }
    }

    out
}
