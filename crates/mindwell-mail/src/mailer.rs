//! Delivery backends.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Email, Error, Result};

/// Which delivery backend to use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailProvider {
    /// Write messages to the log.
    #[default]
    Log,
    /// POST messages to an HTTP mail service.
    Http,
}

/// Sends rendered emails.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Backend name for logs.
    fn name(&self) -> &'static str;

    /// Deliver one message.
    async fn send(&self, email: &Email) -> Result<()>;
}

/// Delivers mail through a JSON HTTP API.
///
/// Each message is POSTed as `{from, to, subject, text, template}`; the API
/// key, when set, goes in a bearer `Authorization` header.
#[derive(Clone, Debug)]
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    from: String,
}

#[derive(Serialize)]
struct OutgoingMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
    template: &'a str,
}

impl HttpMailer {
    /// Create a mailer posting to `endpoint` with sender address `from`.
    ///
    /// Requests that take longer than `timeout` fail with [`Error::Http`].
    pub fn new(
        endpoint: &str,
        api_key: Option<String>,
        from: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            return Err(Error::config("mail endpoint must be set for the http provider"));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            from: from.to_string(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn send(&self, email: &Email) -> Result<()> {
        let message = OutgoingMessage {
            from: &self.from,
            to: &email.to,
            subject: &email.subject,
            text: &email.body,
            template: &email.template,
        };
        let mut request = self.client.post(&self.endpoint).json(&message);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        log::debug!("Delivered '{}' email to {}", email.template, email.to);
        Ok(())
    }
}

/// Writes messages to the log instead of sending them.
#[derive(Clone, Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, email: &Email) -> Result<()> {
        log::info!(
            "Email '{}' to {}: {}\n{}",
            email.template,
            email.to,
            email.subject,
            email.body
        );
        Ok(())
    }
}

/// Keeps every message in memory. Used by tests.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<Email>>,
}

impl MemoryMailer {
    /// Create an empty mailbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies of every message sent so far.
    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Messages sent to `to` using `template`.
    pub fn sent_to(&self, to: &str, template: &str) -> Vec<Email> {
        self.sent()
            .into_iter()
            .filter(|e| e.to == to && e.template == template)
            .collect()
    }

    /// Drain the mailbox.
    pub fn take(&self) -> Vec<Email> {
        self.sent
            .lock()
            .map(|mut s| std::mem::take(&mut *s))
            .unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn send(&self, email: &Email) -> Result<()> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(email.clone());
        }
        Ok(())
    }
}
