mod data;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Course id must be positive")]
    InvalidId,
    #[error("Duplicate course id: {0}")]
    DuplicateId(u32),
    #[error("Course {0} has no name")]
    MissingName(u32),
    #[error("Course {0} has no seasons")]
    NoSeasons(u32),
    #[error("Course {0} has no weather styles")]
    NoWeatherStyles(u32),
    #[error("Course {0} has a non-positive distance")]
    InvalidDistance(u32),
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Unknown {kind}: {value}")]
pub struct ParseTagError {
    kind: &'static str,
    value: String,
}

impl ParseTagError {
    fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Season::ALL
            .into_iter()
            .find(|season| season.as_str() == s)
            .ok_or_else(|| ParseTagError::new("season", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum WeatherStyle {
    Clear,
    Cloudy,
    Rainy,
}

impl WeatherStyle {
    pub const ALL: [WeatherStyle; 3] = [WeatherStyle::Clear, WeatherStyle::Cloudy, WeatherStyle::Rainy];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherStyle::Clear => "clear",
            WeatherStyle::Cloudy => "cloudy",
            WeatherStyle::Rainy => "rainy",
        }
    }
}

impl fmt::Display for WeatherStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeatherStyle {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WeatherStyle::ALL
            .into_iter()
            .find(|style| style.as_str() == s)
            .ok_or_else(|| ParseTagError::new("weather style", s))
    }
}

/// Walk length bucket. Only the fixed minute values are representable;
/// serialized as the bare number of minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum WalkDuration {
    Thirty,
    Sixty,
    Ninety,
}

impl WalkDuration {
    pub const ALL: [WalkDuration; 3] = [WalkDuration::Thirty, WalkDuration::Sixty, WalkDuration::Ninety];

    pub fn minutes(self) -> u16 {
        match self {
            WalkDuration::Thirty => 30,
            WalkDuration::Sixty => 60,
            WalkDuration::Ninety => 90,
        }
    }
}

impl TryFrom<u16> for WalkDuration {
    type Error = ParseTagError;

    fn try_from(minutes: u16) -> Result<Self, Self::Error> {
        WalkDuration::ALL
            .into_iter()
            .find(|d| d.minutes() == minutes)
            .ok_or_else(|| ParseTagError::new("duration", minutes.to_string()))
    }
}

impl From<WalkDuration> for u16 {
    fn from(duration: WalkDuration) -> Self {
        duration.minutes()
    }
}

impl fmt::Display for WalkDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.minutes())
    }
}

impl FromStr for WalkDuration {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let minutes: u16 = s
            .trim()
            .parse()
            .map_err(|_| ParseTagError::new("duration", s))?;
        WalkDuration::try_from(minutes)
    }
}

/// One walking route in the catalog. History entries persist full
/// snapshots of this struct, so it round-trips through JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: u32,
    pub name: String,
    pub area: String,
    #[schema(value_type = u16)]
    pub duration: WalkDuration,
    /// Kilometers
    pub distance: f64,
    pub seasons: Vec<Season>,
    pub weather_styles: Vec<WeatherStyle>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_point: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub highlights: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_note: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommended_times: Vec<String>,
}

impl Course {
    pub fn has_season(&self, season: Season) -> bool {
        self.seasons.contains(&season)
    }

    pub fn suits_weather(&self, style: WeatherStyle) -> bool {
        self.weather_styles.contains(&style)
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    courses: Vec<Course>,
}

impl Catalog {
    pub fn new(courses: Vec<Course>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(courses.len());

        for course in &courses {
            if course.id == 0 {
                return Err(CatalogError::InvalidId);
            }
            if !seen.insert(course.id) {
                return Err(CatalogError::DuplicateId(course.id));
            }
            if course.name.trim().is_empty() {
                return Err(CatalogError::MissingName(course.id));
            }
            if course.seasons.is_empty() {
                return Err(CatalogError::NoSeasons(course.id));
            }
            if course.weather_styles.is_empty() {
                return Err(CatalogError::NoWeatherStyles(course.id));
            }
            if !(course.distance > 0.0) {
                return Err(CatalogError::InvalidDistance(course.id));
            }
        }

        Ok(Self { courses })
    }

    /// The bundled Tokyo walking courses.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::new(data::builtin_courses())
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn get(&self, id: u32) -> Option<&Course> {
        self.courses.iter().find(|course| course.id == id)
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Case-insensitive substring match on name or area, in catalog order.
    pub fn search(&self, query: &str) -> Vec<&Course> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.courses.iter().collect();
        }

        self.courses
            .iter()
            .filter(|course| {
                course.name.to_lowercase().contains(&query)
                    || course.area.to_lowercase().contains(&query)
            })
            .collect()
    }
}
