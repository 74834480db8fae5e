//! Chatbot wizard service.
//!
//! Every step is persisted by an external service; this layer scopes calls to
//! the signed-in company and derives wizard progress and the embed snippet.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{
    Appearance, BasicInfo, ChatbotConfig, EmbedSnippet, ScrapeJob, WizardProgress,
};
use crate::errors::{AppError, AppResult};
use crate::infra::{ChatbotBackend, Scraper};

#[async_trait]
pub trait ChatbotService: Send + Sync {
    async fn save_basic_info(&self, company_id: &str, info: BasicInfo) -> AppResult<BasicInfo>;

    /// Kick off training from the company website
    async fn start_scrape(
        &self,
        company_id: &str,
        website_url: String,
        max_pages: Option<u32>,
    ) -> AppResult<ScrapeJob>;

    async fn scrape_status(&self, company_id: &str, job_id: &str) -> AppResult<ScrapeJob>;

    async fn save_appearance(&self, company_id: &str, appearance: Appearance)
        -> AppResult<Appearance>;

    /// Saved configuration, empty when nothing was configured yet
    async fn get_config(&self, company_id: &str) -> AppResult<ChatbotConfig>;

    async fn wizard_progress(&self, company_id: &str) -> AppResult<WizardProgress>;

    fn embed_snippet(&self, company_id: &str) -> EmbedSnippet;
}

/// Trim a required field; blank after trimming counts as missing.
fn required(value: String, field: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::validation(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub struct ChatbotManager {
    backend: Arc<dyn ChatbotBackend>,
    scraper: Arc<dyn Scraper>,
    widget_script_url: String,
}

impl ChatbotManager {
    pub fn new(
        backend: Arc<dyn ChatbotBackend>,
        scraper: Arc<dyn Scraper>,
        widget_script_url: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            scraper,
            widget_script_url: widget_script_url.into(),
        }
    }
}

#[async_trait]
impl ChatbotService for ChatbotManager {
    async fn save_basic_info(&self, company_id: &str, info: BasicInfo) -> AppResult<BasicInfo> {
        let info = BasicInfo {
            company_name: required(info.company_name, "Company name")?,
            website_url: required(info.website_url, "Website URL")?,
            description: trimmed(info.description),
            industry: trimmed(info.industry),
        };

        self.backend.save_basic_info(company_id, &info).await?;
        tracing::info!(company_id, "Basic info saved");
        Ok(info)
    }

    async fn start_scrape(
        &self,
        company_id: &str,
        website_url: String,
        max_pages: Option<u32>,
    ) -> AppResult<ScrapeJob> {
        self.scraper
            .start(company_id, website_url.trim(), max_pages)
            .await
    }

    async fn scrape_status(&self, company_id: &str, job_id: &str) -> AppResult<ScrapeJob> {
        let job = self.scraper.status(company_id, job_id).await?;
        if job.status.is_finished() {
            tracing::debug!(company_id, job_id, status = ?job.status, "Scrape finished");
        }
        Ok(job)
    }

    async fn save_appearance(
        &self,
        company_id: &str,
        appearance: Appearance,
    ) -> AppResult<Appearance> {
        let appearance = Appearance {
            bot_name: required(appearance.bot_name, "Bot name")?,
            primary_color: appearance.primary_color.to_uppercase(),
            welcome_message: required(appearance.welcome_message, "Welcome message")?,
            position: appearance.position,
            avatar_url: trimmed(appearance.avatar_url),
        };

        self.backend.save_appearance(company_id, &appearance).await?;
        tracing::info!(company_id, "Appearance saved");
        Ok(appearance)
    }

    async fn get_config(&self, company_id: &str) -> AppResult<ChatbotConfig> {
        Ok(self
            .backend
            .fetch_config(company_id)
            .await?
            .unwrap_or_else(|| ChatbotConfig::empty(company_id)))
    }

    async fn wizard_progress(&self, company_id: &str) -> AppResult<WizardProgress> {
        let config = self.get_config(company_id).await?;
        Ok(WizardProgress::from_config(&config))
    }

    fn embed_snippet(&self, company_id: &str) -> EmbedSnippet {
        EmbedSnippet::new(&self.widget_script_url, company_id)
    }
}
