use std::fmt::Write as _;
use std::path::Path;

use plantcare_schedule::{Calendar, CalendarMonth, WeekStart, parse_month};
use plantcare_shared::DateKey;
use time::{Date, Weekday};

use super::{display_name, load_plants, resolve_today};
use crate::config::Config;

const MONDAY_FIRST: [Weekday; 7] = [
    Weekday::Monday,
    Weekday::Tuesday,
    Weekday::Wednesday,
    Weekday::Thursday,
    Weekday::Friday,
    Weekday::Saturday,
    Weekday::Sunday,
];

pub fn show(
    config: Config,
    plants_path: &Path,
    year: Option<i32>,
    month: Option<u8>,
    today: Option<String>,
) -> anyhow::Result<()> {
    let today = resolve_today(today.as_deref(), &config)?;
    let plants = load_plants(plants_path)?;
    let year = year.unwrap_or(today.year());
    let month = match month {
        Some(month) => parse_month(month)?,
        None => today.month(),
    };

    let calendar = Calendar::new(config.cache.capacity, config.schedule.week_start);
    let view = calendar.month(&plants, year, month, today)?;

    tracing::info!(
        year,
        month = u8::from(month),
        watering_days = view.watering_days.len(),
        "rendered calendar"
    );
    print!("{}", render(&view));

    Ok(())
}

fn weekday_header(week_start: WeekStart) -> String {
    let shift = match week_start {
        WeekStart::Monday => 0,
        WeekStart::Sunday => 6,
    };

    (0..7)
        .map(|column| {
            let name = MONDAY_FIRST[(column + shift) % 7].to_string();
            format!("{:<3}", &name[..2])
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn cell(view: &CalendarMonth, date: Option<Date>) -> String {
    let Some(date) = date else {
        return "   ".to_string();
    };

    let mark = match view.watering_days.get(DateKey::from(date).as_str()) {
        Some(day) if day.has_late() => '!',
        Some(_) => '*',
        None => ' ',
    };
    format!("{:>2}{mark}", date.day())
}

/// Month grid with `*` on watering days and `!` where a watering was missed,
/// followed by the plants of each watering day.
pub fn render(view: &CalendarMonth) -> String {
    let grid = &view.grid;
    let mut out = String::new();

    let _ = writeln!(out, "{} {}", grid.month, grid.year);
    let _ = writeln!(out, "{}", weekday_header(grid.week_start).trim_end());
    for week in &grid.weeks {
        let row: Vec<String> = week.iter().map(|date| cell(view, *date)).collect();
        let _ = writeln!(out, "{}", row.join(" ").trim_end());
    }

    if view.watering_days.is_empty() {
        let _ = writeln!(out, "\nNo waterings scheduled.");
        return out;
    }

    out.push('\n');
    for (key, day) in &view.watering_days {
        let names: Vec<String> = day
            .plants
            .iter()
            .map(|plant| {
                let mut name = display_name(&plant.plant_id, &plant.nickname);
                if plant.is_late {
                    name.push_str(" (late)");
                } else if plant.is_next_watering {
                    name.push_str(" (next)");
                }
                name
            })
            .collect();
        let _ = writeln!(out, "{key}  {}", names.join(", "));
    }

    out
}
