use reqwest::Client;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{GenerationRequest, GenerationResponse};

const NEWS_PATH: &str = "api/get-news";

/// Client for the local article-retrieval service.
#[derive(Clone)]
pub struct NewsClient {
    client: Client,
    news_url: Url,
}

impl NewsClient {
    pub fn new(client: Client, backend_url: &str) -> Result<Self> {
        Ok(Self {
            client,
            news_url: crate::geo::endpoint(backend_url, NEWS_PATH)?,
        })
    }

    /// Any non-2xx status or unparseable body is an error; there is no
    /// partial result.
    pub async fn fetch_news(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        let response = self
            .client
            .post(self.news_url.clone())
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::NewsService(format!("HTTP {status}: {error_text}")));
        }

        let body = response.bytes().await?;
        let news: GenerationResponse = serde_json::from_slice(&body)?;
        Ok(news)
    }
}
