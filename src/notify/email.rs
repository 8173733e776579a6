use crate::models::ContactSubmission;
use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::{info, warn};

/// A rendered message ready for a transport
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Common trait for mail transports
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver `email`, returning the transport's message ID
    async fn send(&self, email: &OutgoingEmail) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Implicit TLS (usually port 465); otherwise STARTTLS
    pub secure: bool,
    pub user: String,
    pub password: String,
    pub from: String,
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let builder = if config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        }
        .with_context(|| format!("Failed to configure SMTP relay {}", config.host))?;

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.user.clone(),
                config.password.clone(),
            ))
            .timeout(Some(Duration::from_secs(30)))
            .build();

        let from = config
            .from
            .parse::<Mailbox>()
            .with_context(|| format!("Invalid sender address {}", config.from))?;

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<String> {
        let to = email
            .to
            .parse::<Mailbox>()
            .with_context(|| format!("Invalid recipient address {}", email.to))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.clone())
            .message_id(None)
            .multipart(MultiPart::alternative_plain_html(
                email.text.clone(),
                email.html.clone(),
            ))
            .context("Failed to build email")?;

        let message_id = message
            .headers()
            .get_raw("Message-ID")
            .map(str::to_owned)
            .unwrap_or_default();

        self.transport
            .send(message)
            .await
            .with_context(|| format!("SMTP delivery to {} failed", email.to))?;

        info!("Email sent to {}: {}", email.to, message_id);
        Ok(message_id)
    }
}

/// Stand-in when SMTP credentials are not configured: logs and reports success
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<String> {
        warn!("Email not configured, skipping message to {}", email.to);
        Ok(String::new())
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn submitted(submission: &ContactSubmission) -> String {
    submission
        .submitted_at
        .format("%B %-d, %Y %H:%M UTC")
        .to_string()
}

/// Notification to the agency inbox
pub fn company_notification(submission: &ContactSubmission, company: &str) -> OutgoingEmail {
    let name = escape_html(&submission.name);
    let email = escape_html(&submission.email);
    let message = escape_html(&submission.message);
    let when = submitted(submission);

    let phone_html = submission
        .phone
        .as_deref()
        .map(|p| {
            let p = escape_html(p);
            format!(r#"<p><strong>Phone:</strong> <a href="tel:{p}">{p}</a></p>"#)
        })
        .unwrap_or_default();
    let phone_text = submission
        .phone
        .as_deref()
        .map(|p| format!("Phone: {}\n", p))
        .unwrap_or_default();

    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  <h2 style="color: #059669;">New Contact Form Submission</h2>
  <div style="background-color: #f9f9f9; padding: 15px; border-radius: 5px;">
    <h3>Contact Details:</h3>
    <p><strong>Name:</strong> {name}</p>
    <p><strong>Email:</strong> <a href="mailto:{email}">{email}</a></p>
    {phone_html}
    <p><strong>Submitted:</strong> {when}</p>
  </div>
  <div style="background-color: #f0f9ff; padding: 15px; border-left: 4px solid #0284c7;">
    <h3>Message:</h3>
    <p style="white-space: pre-wrap;">{message}</p>
  </div>
  <p><strong>Next Steps:</strong> Please respond to this inquiry within 24 hours.</p>
</div>"#
    );

    let text = format!(
        "New Contact Form Submission\n\nName: {}\nEmail: {}\n{}Submitted: {}\n\nMessage:\n{}\n\nPlease respond to this inquiry within 24 hours.\n",
        submission.name, submission.email, phone_text, when, submission.message
    );

    OutgoingEmail {
        to: company.to_string(),
        subject: format!("New Contact Form Submission - {}", submission.name),
        html,
        text,
    }
}

/// Auto-reply to the person who wrote in
pub fn auto_reply(submission: &ContactSubmission) -> OutgoingEmail {
    let name = escape_html(&submission.name);
    let message = escape_html(&submission.message);
    let when = submitted(submission);

    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  <h2 style="color: #059669;">Thank You for Contacting Us!</h2>
  <p>Dear {name},</p>
  <p>We have received your message and will get back to you as soon as possible, typically within 24 hours.</p>
  <div style="background-color: #f9f9f9; padding: 15px; border-radius: 5px;">
    <h3>Your Message Summary:</h3>
    <p><strong>Submitted:</strong> {when}</p>
    <p style="white-space: pre-wrap;">{message}</p>
  </div>
  <p>Best regards,<br>Your Real Estate Team</p>
  <p style="font-size: 12px; color: #6b7280;">This is an automated response. Please do not reply to this email directly.</p>
</div>"#
    );

    let text = format!(
        "Dear {},\n\nWe have received your message and will get back to you as soon as possible, typically within 24 hours.\n\nYour Message Summary:\nSubmitted: {}\nMessage: {}\n\nBest regards,\nYour Real Estate Team\n\nThis is an automated response. Please do not reply to this email directly.\n",
        submission.name, when, submission.message
    );

    OutgoingEmail {
        to: submission.email.clone(),
        subject: "Thank you for contacting us - We received your message".to_string(),
        html,
        text,
    }
}
