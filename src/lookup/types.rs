use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::catalog::WeatherStyle;

/// A photo plus the attribution the photo service requires us to show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseImage {
    pub url: String,
    pub photographer: String,
    pub photographer_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentWeather {
    /// Rounded °C
    pub temperature: i32,
    pub weather_style: WeatherStyle,
    pub description: String,
    pub icon: String,
}

// Unsplash search/photos payload

#[derive(Debug, Clone, Deserialize)]
pub struct UnsplashSearchResponse {
    pub results: Vec<UnsplashPhoto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnsplashPhoto {
    pub urls: UnsplashUrls,
    pub user: UnsplashUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnsplashUrls {
    pub regular: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnsplashUser {
    pub name: String,
    pub links: UnsplashUserLinks,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnsplashUserLinks {
    pub html: String,
}

// OpenWeather data/2.5/weather payload

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentWeatherResponse {
    pub weather: Vec<WeatherCondition>,
    pub main: CurrentMain,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherCondition {
    pub id: i32,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentMain {
    pub temp: f64,
}

impl From<UnsplashPhoto> for CourseImage {
    fn from(photo: UnsplashPhoto) -> Self {
        Self {
            url: photo.urls.regular,
            photographer: photo.user.name,
            photographer_url: photo.user.links.html,
        }
    }
}
