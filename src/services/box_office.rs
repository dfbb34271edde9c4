use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use crate::models::{BoxOffice, Revenue};

pub const SOURCE_LABEL: &str = "BoxOfficeAPI";
pub const CURRENCY: &str = "USD";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum BoxOfficeError {
    #[error("movie not found in box office API")]
    NotFound,

    #[error("box office API returned status: {0}")]
    Upstream(StatusCode),

    #[error("box office API request failed: {0}")]
    Transport(String),

    #[error("invalid box office response: {0}")]
    Decode(String),
}

/// Source of box-office figures for a movie title.
#[async_trait]
pub trait BoxOfficeProvider: Send + Sync {
    async fn get_movie_data(&self, title: &str) -> Result<BoxOffice, BoxOfficeError>;
}

#[derive(Debug, Deserialize)]
struct BoxOfficeApiResponse {
    #[serde(default)]
    revenue: ApiRevenue,
}

#[derive(Debug, Default, Deserialize)]
struct ApiRevenue {
    #[serde(default)]
    worldwide: i64,
    #[serde(default, rename = "openingWeekendUSA")]
    opening_weekend_usa: i64,
}

#[derive(Clone)]
pub struct BoxOfficeClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl BoxOfficeClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, BoxOfficeError> {
        Self::with_timeout(base_url, api_key, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, BoxOfficeError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BoxOfficeError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl BoxOfficeProvider for BoxOfficeClient {
    async fn get_movie_data(&self, title: &str) -> Result<BoxOffice, BoxOfficeError> {
        let url = format!("{}/boxoffice", self.base_url);

        let res = self
            .client
            .get(&url)
            .query(&[("title", title)])
            .header("X-API-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| BoxOfficeError::Transport(e.to_string()))?;

        match res.status() {
            StatusCode::NOT_FOUND => return Err(BoxOfficeError::NotFound),
            status if !status.is_success() => return Err(BoxOfficeError::Upstream(status)),
            _ => {}
        }

        let body = res
            .bytes()
            .await
            .map_err(|e| BoxOfficeError::Transport(e.to_string()))?;

        let data: BoxOfficeApiResponse =
            serde_json::from_slice(&body).map_err(|e| BoxOfficeError::Decode(e.to_string()))?;

        // Currency and source are ours to state; the provider's own fields are ignored.
        Ok(BoxOffice {
            revenue: Revenue {
                worldwide: data.revenue.worldwide,
                opening_weekend_usa: data.revenue.opening_weekend_usa,
            },
            currency: CURRENCY.to_string(),
            source: SOURCE_LABEL.to_string(),
            last_updated: Utc::now(),
        })
    }
}
