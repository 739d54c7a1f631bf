/// Remote catalog client module
use crate::domain::{Planet, PlanetListResponse};
use crate::errors::{ApiError, ApiResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// HTTP client wrapper with common configuration
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(timeout: Duration, user_agent: &str) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    pub fn get_client(&self) -> &Client {
        &self.client
    }
}

/// The two catalog endpoints the app consumes
#[async_trait]
pub trait StarWarsApi: Send + Sync {
    /// `GET planets?page={page}`
    async fn get_planets(&self, page: u32) -> ApiResult<PlanetListResponse>;

    /// `GET planets/{id}`
    async fn get_planet_details(&self, id: u32) -> ApiResult<Planet>;
}

/// reqwest-backed catalog client
pub struct StarWarsClient {
    http_client: HttpClient,
    base_url: String,
}

impl StarWarsClient {
    pub fn new(http_client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("--> GET {} {:?}", url, query);

        let resp = self
            .http_client
            .get_client()
            .get(&url)
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        debug!("<-- {} {} ({} bytes)", status.as_u16(), url, body.len());

        if !status.is_success() {
            return Err(ApiError::Status { status, body });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl StarWarsApi for StarWarsClient {
    async fn get_planets(&self, page: u32) -> ApiResult<PlanetListResponse> {
        self.get_json("planets", &[("page", page.to_string())]).await
    }

    async fn get_planet_details(&self, id: u32) -> ApiResult<Planet> {
        self.get_json(&format!("planets/{}", id), &[]).await
    }
}
