//! Email background job.
//!
//! Verification codes and password reset links are queued by the API and
//! delivered here. Without `SMTP_HOST` the message is logged instead of sent.

use std::env;

use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_SMTP_FROM, OTP_EXPIRATION_MINUTES, RESET_TOKEN_EXPIRATION_MINUTES};
use crate::errors::AppError;

/// Email job payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailJob {
    /// Recipient email address
    pub to: String,
    pub subject: String,
    /// Plain text body
    pub body: String,
}

impl EmailJob {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// Signup verification code.
    pub fn verification_code(to: &str, name: &str, code: &str) -> Self {
        Self::new(
            to,
            "Your GenBotAI verification code",
            format!(
                "Hi {},\n\n\
                 Your verification code is {}.\n\
                 It expires in {} minutes.\n\n\
                 If you did not create a GenBotAI account, ignore this email.\n",
                name, code, OTP_EXPIRATION_MINUTES
            ),
        )
    }

    /// Password reset link.
    pub fn password_reset(to: &str, name: &str, link: &str) -> Self {
        Self::new(
            to,
            "Reset your GenBotAI password",
            format!(
                "Hi {},\n\n\
                 Use the link below to choose a new password:\n{}\n\n\
                 The link expires in {} minutes and can be used once.\n\
                 If you did not ask for a reset, ignore this email.\n",
                name, link, RESET_TOKEN_EXPIRATION_MINUTES
            ),
        )
    }
}

/// SMTP settings from environment.
#[derive(Clone)]
struct SmtpSettings {
    host: Option<String>,
    port: u16,
    user: Option<String>,
    pass: Option<String>,
    from: String,
}

impl SmtpSettings {
    fn from_env() -> Self {
        Self {
            host: env::var("SMTP_HOST").ok().filter(|h| !h.is_empty()),
            port: env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(587),
            user: env::var("SMTP_USER").ok(),
            pass: env::var("SMTP_PASS").ok(),
            from: env::var("SMTP_FROM").unwrap_or_else(|_| DEFAULT_SMTP_FROM.to_string()),
        }
    }
}

static SMTP: Lazy<SmtpSettings> = Lazy::new(SmtpSettings::from_env);

/// Email job handler - processes email sending jobs
pub async fn email_job_handler(job: EmailJob) -> Result<(), AppError> {
    let settings = SMTP.clone();

    tracing::info!(to = %job.to, subject = %job.subject, "Processing email job");

    let Some(host) = settings.host.as_deref() else {
        // Development mode: log the email instead of sending
        tracing::warn!("SMTP not configured - logging email instead of sending");
        tracing::info!(
            "=== EMAIL (not sent) ===\n\
             From: {}\n\
             To: {}\n\
             Subject: {}\n\
             Body:\n{}\n\
             ========================",
            settings.from,
            job.to,
            job.subject,
            job.body
        );
        return Ok(());
    };

    let message = build_message(&settings.from, &job)?;

    let mut transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        .map_err(|e| AppError::internal(format!("Failed to configure SMTP relay: {}", e)))?
        .port(settings.port);
    if let (Some(user), Some(pass)) = (settings.user, settings.pass) {
        transport = transport.credentials(Credentials::new(user, pass));
    }

    transport.build().send(message).await.map_err(|e| {
        tracing::error!(to = %job.to, "Failed to send email: {}", e);
        AppError::internal(format!("Failed to send email: {}", e))
    })?;

    tracing::info!(to = %job.to, "Email sent");
    Ok(())
}

fn build_message(from: &str, job: &EmailJob) -> Result<Message, AppError> {
    Message::builder()
        .from(
            from.parse()
                .map_err(|e| AppError::internal(format!("Invalid from address: {}", e)))?,
        )
        .to(job
            .to
            .parse()
            .map_err(|e| AppError::bad_request(format!("Invalid recipient email: {}", e)))?)
        .subject(job.subject.as_str())
        .header(ContentType::TEXT_PLAIN)
        .body(job.body.clone())
        .map_err(|e| AppError::internal(format!("Failed to build email message: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_email_contains_code() {
        let job = EmailJob::verification_code("jane@example.com", "Jane", "123456");
        assert_eq!(job.to, "jane@example.com");
        assert!(job.body.contains("123456"));
        assert!(job.body.contains("Hi Jane"));
    }

    #[test]
    fn test_reset_email_contains_link() {
        let link = "http://localhost:3001/reset-password?token=abc.def";
        let job = EmailJob::password_reset("jane@example.com", "Jane", link);
        assert!(job.body.contains(link));
    }

    #[test]
    fn test_build_message() {
        let job = EmailJob::new("jane@example.com", "Hello", "Body");
        assert!(build_message(DEFAULT_SMTP_FROM, &job).is_ok());

        let bad = EmailJob::new("not-an-address", "Hello", "Body");
        assert!(matches!(
            build_message(DEFAULT_SMTP_FROM, &bad),
            Err(AppError::BadRequest(_))
        ));
    }
}
