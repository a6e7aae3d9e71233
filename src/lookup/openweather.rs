use super::types::*;
use super::{Lookup, LookupError};
use crate::catalog::WeatherStyle;
use crate::config::Config;
use crate::utils::validate_coordinates;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// OpenWeather condition code to the catalog's weather style.
pub fn weather_style_for_code(code: i32) -> WeatherStyle {
    match code {
        // Thunderstorm, drizzle, rain, snow
        200..=699 => WeatherStyle::Rainy,
        // Mist, haze, fog and other atmosphere codes
        700..=799 => WeatherStyle::Cloudy,
        800 => WeatherStyle::Clear,
        801..=804 => WeatherStyle::Cloudy,
        _ => WeatherStyle::Clear,
    }
}

pub struct OpenWeatherClient {
    client: Client,
    config: Config,
}

impl OpenWeatherClient {
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent("WalkRandomizer/1.0")
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { client, config })
    }

    /// Cache key for the fixed location this client reports on.
    pub fn location_key(&self) -> String {
        format!("{:.4},{:.4}", self.config.weather_lat, self.config.weather_lon)
    }

    pub async fn get_current_weather(&self) -> Result<CurrentWeather, LookupError> {
        let api_key = self
            .config
            .openweather_api_key
            .as_deref()
            .ok_or(LookupError::Configuration("OPENWEATHERMAP_API_KEY"))?;

        let (lat, lon) = (self.config.weather_lat, self.config.weather_lon);
        validate_coordinates(lat, lon).map_err(LookupError::Validation)?;

        let url = format!(
            "{}{}",
            self.config.openweather_base_url, self.config.openweather_current_path
        );

        let response = self
            .make_request(&url, &[
                ("lat", &lat.to_string()),
                ("lon", &lon.to_string()),
                ("units", "metric"),
                ("lang", &self.config.weather_lang),
                ("appid", api_key),
            ])
            .await?;

        let current: CurrentWeatherResponse = serde_json::from_value(response)
            .map_err(|e| LookupError::Upstream(format!("unexpected weather payload: {}", e)))?;

        CurrentWeather::try_from(current)
    }

    async fn make_request(&self, url: &str, params: &[(&str, &str)]) -> Result<Value, LookupError> {
        let response = self.client.get(url).query(params).send().await?;

        match response.status() {
            reqwest::StatusCode::OK => {
                let json: Value = response.json().await?;
                Ok(json)
            }
            status => {
                let error_text = response.text().await.unwrap_or_default();
                Err(LookupError::Upstream(format!(
                    "HTTP {}: {}",
                    status, error_text
                )))
            }
        }
    }
}

#[async_trait]
impl Lookup for OpenWeatherClient {
    type Output = CurrentWeather;

    async fn fetch(&self, _key: &str) -> Result<CurrentWeather, LookupError> {
        self.get_current_weather().await
    }
}

impl TryFrom<CurrentWeatherResponse> for CurrentWeather {
    type Error = LookupError;

    fn try_from(response: CurrentWeatherResponse) -> Result<Self, Self::Error> {
        let condition = response
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| LookupError::Upstream("weather payload has no conditions".to_string()))?;

        Ok(Self {
            temperature: response.main.temp.round() as i32,
            weather_style: weather_style_for_code(condition.id),
            description: condition.description,
            icon: condition.icon,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, key: Option<&str>) -> OpenWeatherClient {
        let config = Config {
            openweather_api_key: key.map(|k| k.to_string()),
            openweather_base_url: server.uri(),
            ..Config::default()
        };
        OpenWeatherClient::new(config).unwrap()
    }

    #[test]
    fn test_weather_code_mapping() {
        assert_eq!(weather_style_for_code(201), WeatherStyle::Rainy);
        assert_eq!(weather_style_for_code(600), WeatherStyle::Rainy);
        assert_eq!(weather_style_for_code(741), WeatherStyle::Cloudy);
        assert_eq!(weather_style_for_code(800), WeatherStyle::Clear);
        assert_eq!(weather_style_for_code(803), WeatherStyle::Cloudy);
    }

    #[test]
    fn test_weather_code_edges() {
        assert_eq!(weather_style_for_code(199), WeatherStyle::Clear);
        assert_eq!(weather_style_for_code(200), WeatherStyle::Rainy);
        assert_eq!(weather_style_for_code(699), WeatherStyle::Rainy);
        assert_eq!(weather_style_for_code(700), WeatherStyle::Cloudy);
        assert_eq!(weather_style_for_code(799), WeatherStyle::Cloudy);
        assert_eq!(weather_style_for_code(804), WeatherStyle::Cloudy);
        assert_eq!(weather_style_for_code(805), WeatherStyle::Clear);
        assert_eq!(weather_style_for_code(0), WeatherStyle::Clear);
    }

    #[tokio::test]
    async fn test_current_weather_is_mapped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("appid", "weather-key"))
            .and(query_param("units", "metric"))
            .and(query_param("lat", "35.6812"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "weather": [{ "id": 501, "main": "Rain", "description": "moderate rain", "icon": "10d" }],
                "main": { "temp": 17.6, "feels_like": 17.1, "humidity": 88 },
                "name": "Tokyo"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("weather-key"));
        let weather = client.get_current_weather().await.unwrap();

        assert_eq!(weather.temperature, 18);
        assert_eq!(weather.weather_style, WeatherStyle::Rainy);
        assert_eq!(weather.description, "moderate rain");
        assert_eq!(weather.icon, "10d");
    }

    #[tokio::test]
    async fn test_server_error_is_upstream_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "cod": 401, "message": "Invalid API key" })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("bad-key"));
        let err = client.get_current_weather().await.unwrap_err();
        assert!(matches!(err, LookupError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_empty_conditions_is_upstream_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "weather": [],
                "main": { "temp": 10.0 }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("weather-key"));
        assert!(matches!(
            client.get_current_weather().await,
            Err(LookupError::Upstream(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_key_is_configuration_failure() {
        let server = MockServer::start().await;
        let client = client_for(&server, None);

        assert_eq!(
            client.get_current_weather().await.unwrap_err(),
            LookupError::Configuration("OPENWEATHERMAP_API_KEY")
        );
    }

    #[test]
    fn test_location_key_uses_configured_point() {
        let client = OpenWeatherClient::new(Config::default()).unwrap();
        assert_eq!(client.location_key(), "35.6812,139.7671");
    }
}
