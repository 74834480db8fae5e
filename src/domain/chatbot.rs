//! Chatbot configuration and the creation wizard.
//!
//! The configuration itself lives in the external chatbot service; these
//! types describe what is exchanged with it and how wizard progress is
//! derived from it.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Company details collected in the first wizard step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BasicInfo {
    #[schema(example = "Acme Inc.")]
    pub company_name: String,
    #[schema(example = "https://acme.com")]
    pub website_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "We sell anvils to coyotes")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Retail")]
    pub industry: Option<String>,
}

/// Corner of the host page the widget is pinned to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetPosition {
    #[default]
    BottomRight,
    BottomLeft,
}

/// Widget look and greeting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Appearance {
    #[schema(example = "Acme Assistant")]
    pub bot_name: String,
    /// `#RRGGBB`
    #[schema(example = "#4F46E5")]
    pub primary_color: String,
    #[schema(example = "Hi! How can I help you today?")]
    pub welcome_message: String,
    #[serde(default)]
    pub position: WidgetPosition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            bot_name: "Assistant".to_string(),
            primary_color: "#4F46E5".to_string(),
            welcome_message: "Hi! How can I help you today?".to_string(),
            position: WidgetPosition::BottomRight,
            avatar_url: None,
        }
    }
}

/// Everything the chatbot service stores for a company
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChatbotConfig {
    #[serde(default)]
    pub company_id: String,
    #[serde(default)]
    pub basic_info: Option<BasicInfo>,
    #[serde(default)]
    pub appearance: Option<Appearance>,
    /// Set by the backend once scraped content has been indexed
    #[serde(default)]
    pub trained: bool,
}

impl ChatbotConfig {
    pub fn empty(company_id: impl Into<String>) -> Self {
        Self {
            company_id: company_id.into(),
            ..Self::default()
        }
    }
}

/// Wizard steps in the order the UI presents them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    BasicInfo,
    Training,
    Appearance,
    Install,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::BasicInfo,
        WizardStep::Training,
        WizardStep::Appearance,
        WizardStep::Install,
    ];
}

/// Where the user stands in the wizard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct WizardProgress {
    pub current_step: WizardStep,
    pub completed_steps: Vec<WizardStep>,
}

impl WizardProgress {
    /// The current step is the first one not yet completed. `Install` is
    /// never "completed": it is where a finished setup rests.
    pub fn from_config(config: &ChatbotConfig) -> Self {
        let done = |step: &WizardStep| match step {
            WizardStep::BasicInfo => config.basic_info.is_some(),
            WizardStep::Training => config.trained,
            WizardStep::Appearance => config.appearance.is_some(),
            WizardStep::Install => false,
        };

        let completed_steps: Vec<WizardStep> =
            WizardStep::ALL.iter().filter(|s| done(s)).copied().collect();
        let current_step = WizardStep::ALL
            .iter()
            .find(|s| !done(s))
            .copied()
            .unwrap_or(WizardStep::Install);

        Self {
            current_step,
            completed_steps,
        }
    }
}

/// State of a website scrape as reported by the scraping service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeState {
    Pending,
    Running,
    Completed,
    Failed,
}

impl ScrapeState {
    pub fn is_finished(&self) -> bool {
        matches!(self, ScrapeState::Completed | ScrapeState::Failed)
    }
}

/// Scrape job status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScrapeJob {
    pub job_id: String,
    pub status: ScrapeState,
    #[serde(default)]
    pub pages_scraped: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Snippet the customer pastes into their site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct EmbedSnippet {
    pub company_id: String,
    #[schema(example = "<script src=\"https://app.genbotai.com/widget.js\" data-company-id=\"cmp_...\" defer></script>")]
    pub snippet: String,
}

impl EmbedSnippet {
    pub fn new(script_url: &str, company_id: &str) -> Self {
        Self {
            company_id: company_id.to_string(),
            snippet: format!(
                "<script src=\"{}\" data-company-id=\"{}\" defer></script>",
                script_url, company_id
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic_info() -> BasicInfo {
        BasicInfo {
            company_name: "Acme".into(),
            website_url: "https://acme.com".into(),
            description: None,
            industry: None,
        }
    }

    #[test]
    fn test_progress_for_empty_config() {
        let progress = WizardProgress::from_config(&ChatbotConfig::empty("cmp_1"));
        assert_eq!(progress.current_step, WizardStep::BasicInfo);
        assert!(progress.completed_steps.is_empty());
    }

    #[test]
    fn test_progress_after_basic_info() {
        let config = ChatbotConfig {
            basic_info: Some(basic_info()),
            ..ChatbotConfig::empty("cmp_1")
        };
        let progress = WizardProgress::from_config(&config);
        assert_eq!(progress.current_step, WizardStep::Training);
        assert_eq!(progress.completed_steps, vec![WizardStep::BasicInfo]);
    }

    #[test]
    fn test_progress_complete_rests_on_install() {
        let config = ChatbotConfig {
            company_id: "cmp_1".into(),
            basic_info: Some(basic_info()),
            appearance: Some(Appearance::default()),
            trained: true,
        };
        let progress = WizardProgress::from_config(&config);
        assert_eq!(progress.current_step, WizardStep::Install);
        assert_eq!(progress.completed_steps.len(), 3);
    }

    #[test]
    fn test_config_tolerates_missing_fields() {
        let config: ChatbotConfig = serde_json::from_str(r#"{"company_id":"cmp_1"}"#).unwrap();
        assert_eq!(config, ChatbotConfig::empty("cmp_1"));
    }

    #[test]
    fn test_position_wire_format() {
        assert_eq!(
            serde_json::to_string(&WidgetPosition::BottomLeft).unwrap(),
            "\"bottom-left\""
        );
    }

    #[test]
    fn test_embed_snippet() {
        let embed = EmbedSnippet::new("https://cdn.genbotai.com/widget.js", "cmp_abc");
        assert_eq!(
            embed.snippet,
            "<script src=\"https://cdn.genbotai.com/widget.js\" data-company-id=\"cmp_abc\" defer></script>"
        );
    }

    #[test]
    fn test_scrape_state_finished() {
        assert!(ScrapeState::Completed.is_finished());
        assert!(ScrapeState::Failed.is_finished());
        assert!(!ScrapeState::Running.is_finished());
    }
}
