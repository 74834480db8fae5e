//! Chatbot wizard service tests.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::{mock, predicate::eq};

use genbot_api::domain::{
    Appearance, BasicInfo, ChatbotConfig, ScrapeJob, ScrapeState, WidgetPosition, WizardStep,
};
use genbot_api::errors::{AppError, AppResult};
use genbot_api::infra::{ChatbotBackend, Scraper};
use genbot_api::services::{ChatbotManager, ChatbotService};

mock! {
    pub Backend {}

    #[async_trait]
    impl ChatbotBackend for Backend {
        async fn save_basic_info(&self, company_id: &str, info: &BasicInfo) -> AppResult<()>;
        async fn save_appearance(&self, company_id: &str, appearance: &Appearance) -> AppResult<()>;
        async fn fetch_config(&self, company_id: &str) -> AppResult<Option<ChatbotConfig>>;
    }
}

mock! {
    pub Crawler {}

    #[async_trait]
    impl Scraper for Crawler {
        async fn start(&self, company_id: &str, url: &str, max_pages: Option<u32>) -> AppResult<ScrapeJob>;
        async fn status(&self, company_id: &str, job_id: &str) -> AppResult<ScrapeJob>;
    }
}

const COMPANY: &str = "cmp_4f9c2a0e6b8d4c3e9a1f7b2d5e6c8a90";
const SCRIPT_URL: &str = "https://app.genbotai.com/widget.js";

fn manager(backend: MockBackend, scraper: MockCrawler) -> ChatbotManager {
    ChatbotManager::new(Arc::new(backend), Arc::new(scraper), SCRIPT_URL)
}

fn basic_info() -> BasicInfo {
    BasicInfo {
        company_name: "Acme".into(),
        website_url: "https://acme.com".into(),
        description: None,
        industry: None,
    }
}

#[tokio::test]
async fn test_save_basic_info_trims_fields() {
    let mut backend = MockBackend::new();
    backend
        .expect_save_basic_info()
        .withf(|company_id, info| {
            company_id.to_string() == COMPANY
                && info.company_name == "Acme"
                && info.description.is_none()
                && info.industry.as_deref() == Some("Retail")
        })
        .times(1)
        .returning(|_, _| Ok(()));
    let service = manager(backend, MockCrawler::new());

    let saved = service
        .save_basic_info(
            COMPANY,
            BasicInfo {
                company_name: "  Acme ".into(),
                website_url: " https://acme.com ".into(),
                description: Some("   ".into()),
                industry: Some(" Retail".into()),
            },
        )
        .await
        .unwrap();

    assert_eq!(saved.website_url, "https://acme.com");
}

#[tokio::test]
async fn test_save_appearance_normalizes_color() {
    let mut backend = MockBackend::new();
    backend
        .expect_save_appearance()
        .withf(|_, appearance| appearance.primary_color == "#AABBCC")
        .times(1)
        .returning(|_, _| Ok(()));
    let service = manager(backend, MockCrawler::new());

    let saved = service
        .save_appearance(
            COMPANY,
            Appearance {
                bot_name: " Ava ".into(),
                primary_color: "#aabbcc".into(),
                welcome_message: "Hello!".into(),
                position: WidgetPosition::BottomLeft,
                avatar_url: Some(String::new()),
            },
        )
        .await
        .unwrap();

    assert_eq!(saved.bot_name, "Ava");
    assert_eq!(saved.avatar_url, None);
    assert_eq!(saved.position, WidgetPosition::BottomLeft);
}

#[tokio::test]
async fn test_blank_company_name_rejected() {
    let mut backend = MockBackend::new();
    backend.expect_save_basic_info().never();
    let service = manager(backend, MockCrawler::new());

    let result = service
        .save_basic_info(
            COMPANY,
            BasicInfo {
                company_name: " \t ".into(),
                ..basic_info()
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(msg)) if msg.contains("Company name")));
}

#[tokio::test]
async fn test_blank_bot_name_rejected() {
    let mut backend = MockBackend::new();
    backend.expect_save_appearance().never();
    let service = manager(backend, MockCrawler::new());

    let result = service
        .save_appearance(
            COMPANY,
            Appearance {
                bot_name: "   ".into(),
                primary_color: "#AABBCC".into(),
                welcome_message: "Hello!".into(),
                position: WidgetPosition::BottomRight,
                avatar_url: None,
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_upstream_failure_propagates() {
    let mut backend = MockBackend::new();
    backend
        .expect_save_basic_info()
        .returning(|_, _| Err(AppError::upstream("chatbot service unavailable")));
    let service = manager(backend, MockCrawler::new());

    let result = service.save_basic_info(COMPANY, basic_info()).await;

    assert!(matches!(result, Err(AppError::Upstream(_))));
}

#[tokio::test]
async fn test_get_config_empty_when_nothing_saved() {
    let mut backend = MockBackend::new();
    backend
        .expect_fetch_config()
        .with(eq(COMPANY))
        .returning(|_| Ok(None));
    let service = manager(backend, MockCrawler::new());

    let config = service.get_config(COMPANY).await.unwrap();

    assert_eq!(config, ChatbotConfig::empty(COMPANY));
}

#[tokio::test]
async fn test_wizard_progress_follows_saved_steps() {
    let mut backend = MockBackend::new();
    backend.expect_fetch_config().returning(|company_id| {
        Ok(Some(ChatbotConfig {
            company_id: company_id.to_string(),
            basic_info: Some(basic_info()),
            appearance: None,
            trained: true,
        }))
    });
    let service = manager(backend, MockCrawler::new());

    let progress = service.wizard_progress(COMPANY).await.unwrap();

    assert_eq!(progress.current_step, WizardStep::Appearance);
    assert_eq!(
        progress.completed_steps,
        vec![WizardStep::BasicInfo, WizardStep::Training]
    );
}

#[tokio::test]
async fn test_start_scrape_passes_company_and_limit() {
    let mut scraper = MockCrawler::new();
    scraper
        .expect_start()
        .with(eq(COMPANY), eq("https://acme.com"), eq(Some(25)))
        .times(1)
        .returning(|_, _, _| {
            Ok(ScrapeJob {
                job_id: "job-1".into(),
                status: ScrapeState::Pending,
                pages_scraped: 0,
                error: None,
            })
        });
    let service = manager(MockBackend::new(), scraper);

    let job = service
        .start_scrape(COMPANY, " https://acme.com ".into(), Some(25))
        .await
        .unwrap();

    assert_eq!(job.job_id, "job-1");
    assert_eq!(job.status, ScrapeState::Pending);
}

#[tokio::test]
async fn test_scrape_status_reports_failure() {
    let mut scraper = MockCrawler::new();
    scraper
        .expect_status()
        .with(eq(COMPANY), eq("job-1"))
        .returning(|_, job_id| {
            Ok(ScrapeJob {
                job_id: job_id.to_string(),
                status: ScrapeState::Failed,
                pages_scraped: 3,
                error: Some("robots.txt disallows crawling".into()),
            })
        });
    let service = manager(MockBackend::new(), scraper);

    let job = service.scrape_status(COMPANY, "job-1").await.unwrap();

    assert!(job.status.is_finished());
    assert_eq!(job.pages_scraped, 3);
    assert!(job.error.is_some());
}

#[test]
fn test_embed_snippet_uses_script_url() {
    let service = manager(MockBackend::new(), MockCrawler::new());

    let embed = service.embed_snippet(COMPANY);

    assert_eq!(embed.company_id, COMPANY);
    assert!(embed.snippet.contains(SCRIPT_URL));
    assert!(embed.snippet.contains(&format!("data-company-id=\"{}\"", COMPANY)));
}
