//! Delivery
//!
//! Stage 7: wrap the finished document into the outgoing email body and
//! hand it to the SMTP relay. The body carries two renditions: the raw HTML
//! source in a textarea for copy-paste publishing, and the rendered preview
//! below it. Delivery failure is the one error that must block the history
//! commit, so it maps to its own variant.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;
use tracing::info;

use crate::config::MailConfig;
use crate::types::{LoomError, Result};

/// Mail-sending collaborator
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, subject: &str, html_body: &str) -> Result<()>;
}

/// TLS relay sender over the configured SMTP host
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let (username, password) = config.credentials()?;
        let from: Mailbox = username
            .parse()
            .map_err(|e| LoomError::Config(format!("mail.username is not an address: {}", e)))?;
        let to: Mailbox = config
            .recipient(&username)
            .parse()
            .map_err(|e| LoomError::Config(format!("mail.recipient is not an address: {}", e)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| LoomError::Delivery(format!("smtp relay init failed: {}", e)))?
            .credentials(Credentials::new(
                username,
                password.expose_secret().to_string(),
            ))
            .build();

        Ok(Self {
            transport,
            from,
            to,
        })
    }
}

#[async_trait]
impl MailSender for SmtpMailer {
    async fn send(&self, subject: &str, html_body: &str) -> Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| LoomError::Delivery(format!("message build failed: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| LoomError::Delivery(format!("smtp send failed: {}", e)))?;
        info!(to = %self.to, "Mail accepted by relay");
        Ok(())
    }
}

/// Final stage over the mail collaborator
pub struct Dispatcher<'a> {
    sender: &'a dyn MailSender,
}

impl<'a> Dispatcher<'a> {
    pub fn new(sender: &'a dyn MailSender) -> Self {
        Self { sender }
    }

    pub async fn dispatch(&self, subject: &str, document: &str) -> Result<()> {
        let body = render_email_body(document);
        info!(subject, body_len = body.len(), "Dispatching");
        self.sender.send(subject, &body).await
    }
}

/// Email body: copyable source block on top, rendered preview below
fn render_email_body(document: &str) -> String {
    let wrapped = wrap_payload(document);
    format!(
        "<div style=\"font-family: sans-serif;\">\n\
         <p style=\"font-weight: bold;\">HTML source (copy into the blog editor):</p>\n\
         <textarea readonly style=\"width: 100%; height: 300px; font-family: monospace; \
         font-size: 12px;\">{source}</textarea>\n\
         <hr style=\"margin: 30px 0;\">\n\
         <p style=\"font-weight: bold;\">Preview:</p>\n\
         {preview}\n\
         </div>",
        source = escape_html(&wrapped),
        preview = wrapped,
    )
}

/// Outer styling container around the finished document
fn wrap_payload(document: &str) -> String {
    format!(
        "<div style=\"max-width: 720px; margin: 0 auto; font-family: sans-serif; \
         line-height: 1.7; color: #333;\">\n{document}\n</div>"
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
