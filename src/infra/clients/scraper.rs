//! Client for the website scraping service.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::http::{path_segment, JsonClient};
use crate::domain::ScrapeJob;
use crate::errors::{AppError, AppResult};

/// Website ingestion used to train a company's chatbot.
#[async_trait]
pub trait Scraper: Send + Sync {
    async fn start(&self, company_id: &str, url: &str, max_pages: Option<u32>)
        -> AppResult<ScrapeJob>;

    async fn status(&self, company_id: &str, job_id: &str) -> AppResult<ScrapeJob>;
}

#[derive(Debug, Serialize)]
struct StartScrape<'a> {
    company_id: &'a str,
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_pages: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct ScraperClient {
    client: JsonClient,
}

impl ScraperClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            client: JsonClient::new("scraper", http, base_url),
        }
    }
}

#[async_trait]
impl Scraper for ScraperClient {
    async fn start(
        &self,
        company_id: &str,
        url: &str,
        max_pages: Option<u32>,
    ) -> AppResult<ScrapeJob> {
        let body = StartScrape {
            company_id,
            url,
            max_pages,
        };
        let job: ScrapeJob = self.client.post("/scrape", &body).await?;
        tracing::info!(company_id, job_id = %job.job_id, "Scrape started");
        Ok(job)
    }

    async fn status(&self, company_id: &str, job_id: &str) -> AppResult<ScrapeJob> {
        let path = format!(
            "/scrape/{}?company_id={}",
            path_segment(job_id)?,
            path_segment(company_id)?
        );
        // Unknown job, or one started for another company
        self.client
            .get_optional(&path)
            .await?
            .ok_or(AppError::NotFound)
    }
}
