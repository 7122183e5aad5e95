use crate::configuration::EmailClientSettings;
use crate::domain::UserEmail;
use crate::email::Email;
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use aws_sdk_sesv2 as ses;
use aws_sdk_sesv2::model::{Body, Content, Destination, EmailContent, Message};
use std::time::Duration;

pub struct SesEmailClient {
    ses_client: ses::Client,
    sender: UserEmail,
    timeout: Duration,
}

impl SesEmailClient {
    pub fn new(ses_client: ses::Client, sender: UserEmail, timeout: Duration) -> Self {
        Self {
            ses_client,
            sender,
            timeout,
        }
    }

    /// Builds a client from the ambient AWS environment (region, credentials).
    pub async fn from_settings(settings: &EmailClientSettings) -> Result<Self, anyhow::Error> {
        let sender = settings.sender().map_err(|e| anyhow!(e))?;
        let shared_config = aws_config::load_from_env().await;
        Ok(Self::new(
            ses::Client::new(&shared_config),
            sender,
            settings.timeout(),
        ))
    }
}

#[async_trait]
impl Email for SesEmailClient {
    #[tracing::instrument(
        name = "Send email through SES",
        skip(self, recipient, html_content, text_content),
        fields(recipient = %recipient)
    )]
    async fn send_email(
        &self,
        recipient: UserEmail,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> Result<(), anyhow::Error> {
        let html_content = Content::builder()
            .data(html_content)
            .charset("UTF-8")
            .build();
        let text_content = Content::builder()
            .data(text_content)
            .charset("UTF-8")
            .build();
        let body = Body::builder()
            .html(html_content)
            .text(text_content)
            .build();
        let subject = Content::builder().data(subject).charset("UTF-8").build();
        let message = Message::builder().subject(subject).body(body).build();
        let content = EmailContent::builder().simple(message).build();
        let destination = Destination::builder()
            .to_addresses(recipient.as_ref())
            .build();

        let request = self
            .ses_client
            .send_email()
            .from_email_address(self.sender.as_ref())
            .destination(destination)
            .content(content)
            .send();
        tokio::time::timeout(self.timeout, request)
            .await
            .context("Timed out waiting for SES to accept the email.")??;
        Ok(())
    }
}
