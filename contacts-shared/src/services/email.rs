/// Outbound email
///
/// Delivery is best-effort from the caller's point of view: the auth gateway
/// logs and drops any `EmailError`. The SMTP mailer uses lettre's async
/// transport with STARTTLS

use async_trait::async_trait;
use lettre::{
    message::header::ContentType,
    transport::smtp::{authentication::Credentials, Error as SmtpError},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::env;

/// Subject line of the verification email
pub const VERIFICATION_SUBJECT: &str = "Email Verification - Contacts API";

/// Errors that can occur when sending email
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport error
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// No SMTP credentials configured
    #[error("Email delivery is not configured")]
    NotConfigured,
}

/// Sends HTML email
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), EmailError>;
}

/// SMTP settings
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

impl SmtpConfig {
    /// Reads `MAIL_*` variables
    ///
    /// Returns `None` when `MAIL_USERNAME` is unset or empty, meaning email
    /// delivery is disabled. `MAIL_FROM` defaults to the username
    pub fn from_env() -> Option<Self> {
        let username = env::var("MAIL_USERNAME").ok().filter(|u| !u.is_empty())?;

        let from_address = env::var("MAIL_FROM")
            .ok()
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| username.clone());

        Some(Self {
            server: env::var("MAIL_SERVER").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
            port: env::var("MAIL_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(587),
            password: env::var("MAIL_PASSWORD").unwrap_or_default(),
            username,
            from_address,
        })
    }
}

/// Mailer backed by an SMTP relay
#[derive(Clone)]
pub struct SmtpMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    /// Create a new SMTP mailer from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the relay host is invalid
    pub fn new(config: &SmtpConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.server)?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())?;

        self.mailer.send(email).await?;
        tracing::debug!(to = %to, subject = %subject, "Email sent");
        Ok(())
    }
}

/// Mailer used when SMTP is not configured; every send fails
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, _to: &str, _subject: &str, _html: &str) -> Result<(), EmailError> {
        Err(EmailError::NotConfigured)
    }
}

/// Renders the verification email body
pub fn verification_email_html(base_url: &str, user_id: i64) -> String {
    let link = format!("{}/auth/verify/{}", base_url.trim_end_matches('/'), user_id);

    format!(
        r#"<h2>Verify your email address</h2>
<p>Hello! Please verify your email address by clicking the link below:</p>
<p><a href="{link}">Verify Email</a></p>
<p>If you didn't create an account, please ignore this email.</p>
"#
    )
}
