use crate::catalog::Course;

const MAPS_DIRECTIONS_URL: &str = "https://www.google.com/maps/dir/?api=1";
const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/?api=1";

/// Walking directions when the course has both endpoints, a place search otherwise.
pub fn map_url(course: &Course) -> String {
    match (course.start_point.as_deref(), course.end_point.as_deref()) {
        (Some(origin), Some(destination)) => format!(
            "{}&origin={}&destination={}&travelmode=walking",
            MAPS_DIRECTIONS_URL,
            urlencoding::encode(origin),
            urlencoding::encode(destination)
        ),
        _ => format!(
            "{}&query={}",
            MAPS_SEARCH_URL,
            urlencoding::encode(&format!("{} {}", course.name, course.area))
        ),
    }
}

/// Photographer profile link carrying the referral parameters the photo service asks for.
pub fn attribution_url(photographer_url: &str, source: &str) -> String {
    let separator = if photographer_url.contains('?') { '&' } else { '?' };
    format!(
        "{}{}utm_source={}&utm_medium=referral",
        photographer_url,
        separator,
        urlencoding::encode(source)
    )
}

pub fn image_query(course: &Course, suffix: &str) -> String {
    [course.area.as_str(), course.name.as_str(), suffix.trim()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Validate latitude and longitude coordinates
pub fn validate_coordinates(lat: f64, lon: f64) -> Result<(), String> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(format!("Invalid latitude: {}. Must be between -90 and 90", lat));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(format!("Invalid longitude: {}. Must be between -180 and 180", lon));
    }
    Ok(())
}
