//! Plain-text rendering of weather data and favorites.

use std::fmt::Write;

use skyview_core::Palette;
use skyview_services::FavoriteCity;
use skyview_weather::{CandidateLocation, CurrentConditions, ForecastEntry, WeatherReport};

const NO_VALUE: &str = "-";

pub fn render_candidates(candidates: &[CandidateLocation]) -> String {
    if candidates.is_empty() {
        return "No matching cities found.\n".to_string();
    }

    let mut out = String::new();
    for (i, candidate) in candidates.iter().enumerate() {
        let _ = writeln!(out, "{:>2}. {}", i + 1, candidate.display_name);
    }
    out
}

pub fn render_current(current: &CurrentConditions) -> String {
    let direction = current
        .wind_direction()
        .map(|d| d.to_string())
        .unwrap_or_else(|| NO_VALUE.to_string());

    let mut out = String::new();
    let _ = writeln!(out, "{}, {}", current.city_name, current.country);
    let _ = writeln!(out, "Weather: {}", current.description_capitalized());
    let _ = writeln!(out, "Temperature: {} °C", current.temperature);
    let _ = writeln!(out, "Wind: {} m/s, {}", current.wind_speed, direction);
    let _ = writeln!(out, "Humidity: {}%", current.humidity);
    let _ = writeln!(out, "Pressure: {} mmHg", current.pressure_mmhg());
    out
}

fn render_entry(entry: &ForecastEntry) -> String {
    let direction = entry
        .wind_direction()
        .map(|d| d.to_string())
        .unwrap_or_else(|| NO_VALUE.to_string());
    let pressure = entry
        .pressure_mmhg()
        .map(|p| format!("{} mmHg", p))
        .unwrap_or_else(|| NO_VALUE.to_string());
    let visibility = entry
        .visibility
        .map(|v| format!("{} m", v))
        .unwrap_or_else(|| NO_VALUE.to_string());

    format!(
        "  {}  {} °C, {}, wind {} m/s {}, humidity {}%, pressure {}, visibility {}, precipitation {}%",
        entry.short_label(),
        entry.temperature,
        entry.description_capitalized(),
        entry.wind_speed,
        direction,
        entry.humidity,
        pressure,
        visibility,
        entry.precipitation_percent(),
    )
}

pub fn render_report(report: &WeatherReport) -> String {
    let mut out = render_current(&report.current);

    for day in report.days() {
        let _ = writeln!(out, "\n{}", day.date.format("%d.%m.%Y"));
        for entry in &day.entries {
            let _ = writeln!(out, "{}", render_entry(entry));
        }
    }
    out
}

pub fn render_favorites(favorites: &[FavoriteCity]) -> String {
    if favorites.is_empty() {
        return "No favorites yet.\n".to_string();
    }

    let mut out = String::new();
    for city in favorites {
        let _ = writeln!(out, "{}  ({:.4}, {:.4})", city.name, city.latitude, city.longitude);
    }
    out
}

pub fn render_palette(name: &str, palette: &Palette) -> String {
    format!(
        "theme: {}\n  background: {}\n  foreground: {}\n  entry: {}\n  button: {}\n",
        name,
        palette.background,
        palette.foreground,
        palette.entry_background,
        palette.button_background
    )
}
