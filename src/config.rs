use std::env;
use std::fmt::Display;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct Config {
    pub unsplash_access_key: Option<String>,
    pub unsplash_base_url: String,
    pub openweather_api_key: Option<String>,
    pub openweather_base_url: String,
    pub openweather_current_path: String,
    pub weather_lat: f64,
    pub weather_lon: f64,
    pub weather_lang: String,
    pub image_cache_ttl_secs: i64,
    pub weather_cache_ttl_secs: i64,
    pub image_query_suffix: String,
    /// `utm_source` value for photo attribution links
    pub attribution_source: String,
    pub app_timezone: chrono_tz::Tz,
    pub database_url: String,
    pub bind_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            unsplash_access_key: None,
            unsplash_base_url: "https://api.unsplash.com".to_string(),
            openweather_api_key: None,
            openweather_base_url: "https://api.openweathermap.org".to_string(),
            openweather_current_path: "/data/2.5/weather".to_string(),
            // Tokyo Station
            weather_lat: 35.6812,
            weather_lon: 139.7671,
            weather_lang: "en".to_string(),
            image_cache_ttl_secs: 24 * 60 * 60,
            weather_cache_ttl_secs: 30 * 60,
            image_query_suffix: "Tokyo Japan".to_string(),
            attribution_source: "walk_randomizer".to_string(),
            app_timezone: chrono_tz::Asia::Tokyo,
            database_url: "sqlite:./walk_randomizer.db?mode=rwc".to_string(),
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Config::default();

        Ok(Config {
            unsplash_access_key: optional_var("UNSPLASH_ACCESS_KEY"),
            unsplash_base_url: env::var("UNSPLASH_BASE_URL").unwrap_or(defaults.unsplash_base_url),
            openweather_api_key: optional_var("OPENWEATHERMAP_API_KEY"),
            openweather_base_url: env::var("OPENWEATHER_BASE_URL")
                .unwrap_or(defaults.openweather_base_url),
            openweather_current_path: env::var("OPENWEATHER_CURRENT_PATH")
                .unwrap_or(defaults.openweather_current_path),
            weather_lat: parse_var("WEATHER_LAT", defaults.weather_lat)?,
            weather_lon: parse_var("WEATHER_LON", defaults.weather_lon)?,
            weather_lang: env::var("WEATHER_LANG").unwrap_or(defaults.weather_lang),
            image_cache_ttl_secs: positive_secs("IMAGE_CACHE_TTL_SECS", defaults.image_cache_ttl_secs)?,
            weather_cache_ttl_secs: positive_secs("WEATHER_CACHE_TTL_SECS", defaults.weather_cache_ttl_secs)?,
            image_query_suffix: env::var("IMAGE_QUERY_SUFFIX").unwrap_or(defaults.image_query_suffix),
            attribution_source: env::var("ATTRIBUTION_SOURCE").unwrap_or(defaults.attribution_source),
            app_timezone: parse_var("APP_TIMEZONE", defaults.app_timezone)?,
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
        })
    }

    pub fn image_cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.image_cache_ttl_secs)
    }

    pub fn weather_cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.weather_cache_ttl_secs)
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} has an invalid value '{}': {}", name, raw, e)),
        Err(_) => Ok(default),
    }
}

/// A TTL of zero or less would make every cached entry stale on arrival.
fn positive_secs(name: &str, default: i64) -> anyhow::Result<i64> {
    let secs = parse_var(name, default)?;
    if secs <= 0 {
        return Err(anyhow::anyhow!("{} must be a positive number of seconds, got {}", name, secs));
    }
    Ok(secs)
}
