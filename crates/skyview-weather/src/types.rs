use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Format of `dt_txt` in forecast responses
pub const FORECAST_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// hPa to mmHg
const MMHG_PER_HPA: f64 = 0.75006;

/// One search result from the geocoder.
///
/// Coordinates are kept exactly as the provider sent them; `select` parses them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateLocation {
    pub display_name: String,
    #[serde(rename = "lat")]
    pub latitude: String,
    #[serde(rename = "lon")]
    pub longitude: String,
}

/// The location a view is currently showing weather for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedLocation {
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl SelectedLocation {
    pub fn new(label: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            label: label.into(),
            latitude,
            longitude,
        }
    }

    /// Short place name: the label up to its first comma.
    pub fn short_name(&self) -> &str {
        self.label.split(',').next().unwrap_or_default().trim()
    }
}

/// Eight-point compass direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompassPoint {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl CompassPoint {
    const ALL: [CompassPoint; 8] = [
        Self::N,
        Self::NE,
        Self::E,
        Self::SE,
        Self::S,
        Self::SW,
        Self::W,
        Self::NW,
    ];

    /// Nearest compass point for a meteorological wind direction in degrees.
    pub fn from_degrees(deg: f64) -> Self {
        let index = ((deg + 22.5) / 45.0).floor().rem_euclid(8.0) as usize;
        Self::ALL[index]
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            Self::N => "N",
            Self::NE => "NE",
            Self::E => "E",
            Self::SE => "SE",
            Self::S => "S",
            Self::SW => "SW",
            Self::W => "W",
            Self::NW => "NW",
        }
    }
}

impl std::fmt::Display for CompassPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// Current weather conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub city_name: String,
    pub country: String,
    pub description: String,
    pub icon: String,
    /// Celsius
    pub temperature: f64,
    pub pressure_hpa: f64,
    /// Percent
    pub humidity: u8,
    /// m/s
    pub wind_speed: f64,
    pub wind_deg: Option<f64>,
}

impl CurrentConditions {
    pub fn pressure_mmhg(&self) -> i64 {
        hpa_to_mmhg(self.pressure_hpa)
    }

    pub fn wind_direction(&self) -> Option<CompassPoint> {
        self.wind_deg.map(CompassPoint::from_degrees)
    }

    pub fn description_capitalized(&self) -> String {
        capitalize(&self.description)
    }
}

/// One three-hourly forecast slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub timestamp: NaiveDateTime,
    pub description: String,
    pub icon: String,
    pub temperature: f64,
    pub pressure_hpa: Option<f64>,
    pub humidity: u8,
    pub wind_speed: f64,
    pub wind_deg: Option<f64>,
    /// Metres
    pub visibility: Option<u32>,
    /// Probability of precipitation, 0.0 to 1.0
    pub pop: f64,
}

impl ForecastEntry {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// `dd.mm HH:MM`
    pub fn short_label(&self) -> String {
        self.timestamp.format("%d.%m %H:%M").to_string()
    }

    pub fn precipitation_percent(&self) -> u8 {
        (self.pop.clamp(0.0, 1.0) * 100.0).floor() as u8
    }

    /// Truncated, unlike `CurrentConditions::pressure_mmhg` which rounds.
    pub fn pressure_mmhg(&self) -> Option<i64> {
        self.pressure_hpa
            .map(|hpa| (hpa * MMHG_PER_HPA).trunc() as i64)
    }

    pub fn wind_direction(&self) -> Option<CompassPoint> {
        self.wind_deg.map(CompassPoint::from_degrees)
    }

    pub fn description_capitalized(&self) -> String {
        capitalize(&self.description)
    }
}

/// Forecast entries sharing a calendar date
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub entries: Vec<ForecastEntry>,
}

/// Group forecast entries by date, preserving provider order.
///
/// A new group starts whenever the date changes from the previous entry.
pub fn group_by_day(entries: &[ForecastEntry]) -> Vec<ForecastDay> {
    let mut days: Vec<ForecastDay> = Vec::new();
    for entry in entries {
        match days.last_mut() {
            Some(day) if day.date == entry.date() => day.entries.push(entry.clone()),
            _ => days.push(ForecastDay {
                date: entry.date(),
                entries: vec![entry.clone()],
            }),
        }
    }
    days
}

/// Current conditions and forecast for one selection
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub current: CurrentConditions,
    pub forecast: Vec<ForecastEntry>,
}

impl WeatherReport {
    pub fn days(&self) -> Vec<ForecastDay> {
        group_by_day(&self.forecast)
    }
}

fn hpa_to_mmhg(hpa: f64) -> i64 {
    (hpa * MMHG_PER_HPA).round() as i64
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
