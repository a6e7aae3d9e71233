use super::types::*;
use super::{Lookup, LookupError};
use crate::config::Config;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use std::time::Duration;

const SEARCH_PHOTOS_PATH: &str = "/search/photos";

pub struct UnsplashClient {
    client: Client,
    config: Config,
}

impl UnsplashClient {
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent("WalkRandomizer/1.0")
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { client, config })
    }

    /// First landscape photo for `query`.
    pub async fn search_photo(&self, query: &str) -> Result<CourseImage, LookupError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(LookupError::Validation("search query is required".to_string()));
        }

        let access_key = self
            .config
            .unsplash_access_key
            .as_deref()
            .ok_or(LookupError::Configuration("UNSPLASH_ACCESS_KEY"))?;

        let url = format!("{}{}", self.config.unsplash_base_url, SEARCH_PHOTOS_PATH);

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Client-ID {}", access_key))
            .query(&[
                ("query", query),
                ("per_page", "1"),
                ("orientation", "landscape"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LookupError::Upstream(format!("HTTP {}: {}", status, error_text)));
        }

        let search: UnsplashSearchResponse = response.json().await?;

        search
            .results
            .into_iter()
            .next()
            .map(CourseImage::from)
            .ok_or_else(|| LookupError::NotFound(format!("no photo for '{}'", query)))
    }
}

#[async_trait]
impl Lookup for UnsplashClient {
    type Output = CourseImage;

    async fn fetch(&self, key: &str) -> Result<CourseImage, LookupError> {
        self.search_photo(key).await
    }
}
