use chrono::{DateTime, Datelike, Utc};

use crate::catalog::Season;

pub fn season_for_month(month: u32) -> Season {
    match month {
        3..=5 => Season::Spring,
        6..=8 => Season::Summer,
        9..=11 => Season::Autumn,
        _ => Season::Winter,
    }
}

impl Season {
    /// Display default for the temperature slider, in °C.
    pub fn representative_temperature(&self) -> i32 {
        match self {
            Season::Spring => 18,
            Season::Summer => 28,
            Season::Autumn => 18,
            Season::Winter => 8,
        }
    }
}

/// Season suggested by an observed temperature. Mild readings are split
/// between spring and autumn using the calendar month.
pub fn season_for_temperature(observed_c: f64, month: u32) -> Season {
    if observed_c >= 25.0 {
        Season::Summer
    } else if observed_c >= 15.0 {
        if (3..=5).contains(&month) {
            Season::Spring
        } else {
            Season::Autumn
        }
    } else {
        Season::Winter
    }
}

/// Calendar month (1-12) right now in the given timezone.
pub fn current_month(timezone: &chrono_tz::Tz) -> u32 {
    month_at(Utc::now(), timezone)
}

/// Calendar month (1-12) of `instant` as seen in `timezone`.
pub fn month_at(instant: DateTime<Utc>, timezone: &chrono_tz::Tz) -> u32 {
    instant.with_timezone(timezone).month()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_boundaries() {
        assert_eq!(season_for_month(2), Season::Winter);
        assert_eq!(season_for_month(3), Season::Spring);
        assert_eq!(season_for_month(5), Season::Spring);
        assert_eq!(season_for_month(6), Season::Summer);
        assert_eq!(season_for_month(8), Season::Summer);
        assert_eq!(season_for_month(9), Season::Autumn);
        assert_eq!(season_for_month(11), Season::Autumn);
        assert_eq!(season_for_month(12), Season::Winter);
        assert_eq!(season_for_month(1), Season::Winter);
    }

    #[test]
    fn test_representative_temperatures() {
        assert_eq!(Season::Spring.representative_temperature(), 18);
        assert_eq!(Season::Summer.representative_temperature(), 28);
        assert_eq!(Season::Autumn.representative_temperature(), 18);
        assert_eq!(Season::Winter.representative_temperature(), 8);
    }

    #[test]
    fn test_temperature_override() {
        assert_eq!(season_for_temperature(25.0, 1), Season::Summer);
        assert_eq!(season_for_temperature(31.5, 10), Season::Summer);
        assert_eq!(season_for_temperature(24.999, 4), Season::Spring);
        assert_eq!(season_for_temperature(15.0, 10), Season::Autumn);
        assert_eq!(season_for_temperature(20.0, 7), Season::Autumn);
        assert_eq!(season_for_temperature(14.9, 4), Season::Winter);
        assert_eq!(season_for_temperature(-3.0, 8), Season::Winter);
    }

    #[test]
    fn test_month_follows_local_calendar() {
        let instant = DateTime::parse_from_rfc3339("2026-02-28T20:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        assert_eq!(month_at(instant, &chrono_tz::Asia::Tokyo), 3);
        assert_eq!(month_at(instant, &chrono_tz::UTC), 2);
        assert_eq!(season_for_month(month_at(instant, &chrono_tz::Asia::Tokyo)), Season::Spring);
    }
}
