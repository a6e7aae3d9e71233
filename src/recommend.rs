use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::catalog::{Catalog, Course, Season, WalkDuration, WeatherStyle};
use crate::season::season_for_month;

pub const MIN_TEMPERATURE: i32 = -5;
pub const MAX_TEMPERATURE: i32 = 40;

/// What the walker asked for. Temperature is carried for display and
/// season suggestion only; it never narrows the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectionCriteria {
    pub season: Season,
    pub temperature: i32,
    pub weather_style: WeatherStyle,
    #[schema(value_type = u16)]
    pub duration: WalkDuration,
}

impl SelectionCriteria {
    /// First-load defaults for the given calendar month.
    pub fn suggested(month: u32) -> Self {
        let season = season_for_month(month);
        Self {
            season,
            temperature: season.representative_temperature(),
            weather_style: WeatherStyle::Clear,
            duration: WalkDuration::Sixty,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&self.temperature) {
            return Err(format!(
                "Invalid temperature: {}. Must be between {} and {}",
                self.temperature, MIN_TEMPERATURE, MAX_TEMPERATURE
            ));
        }
        Ok(())
    }

    pub fn matches(&self, course: &Course) -> bool {
        course.has_season(self.season)
            && course.suits_weather(self.weather_style)
            && course.duration == self.duration
    }
}

#[derive(Debug, Clone)]
pub struct DrawOutcome {
    pub matched: usize,
    pub course: Option<Course>,
}

/// Courses matching `criteria`, in catalog order.
pub fn filter<'a>(catalog: &'a Catalog, criteria: &SelectionCriteria) -> Vec<&'a Course> {
    catalog
        .courses()
        .iter()
        .filter(|course| criteria.matches(course))
        .collect()
}

pub fn match_count(catalog: &Catalog, criteria: &SelectionCriteria) -> usize {
    catalog
        .courses()
        .iter()
        .filter(|course| criteria.matches(course))
        .count()
}

/// Uniform pick. Every call is an independent draw.
pub fn select<'a, R: Rng + ?Sized>(subset: &[&'a Course], rng: &mut R) -> Option<&'a Course> {
    subset.choose(rng).copied()
}

pub fn draw<R: Rng + ?Sized>(catalog: &Catalog, criteria: &SelectionCriteria, rng: &mut R) -> DrawOutcome {
    let subset = filter(catalog, criteria);
    let matched = subset.len();

    if matched == 0 {
        tracing::info!(
            "No course matches {} / {} / {} min",
            criteria.season,
            criteria.weather_style,
            criteria.duration
        );
        return DrawOutcome { matched, course: None };
    }

    let course = select(&subset, rng).cloned();
    if let Some(course) = &course {
        tracing::info!("Drew course {} ({}) out of {} matches", course.id, course.name, matched);
    }

    DrawOutcome { matched, course }
}
