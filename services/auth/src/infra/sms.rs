use std::time::Duration;

use anyhow::Context as _;
use reqwest::Client;
use serde::Deserialize;

use crate::domain::repository::SmsDispatcher;
use crate::domain::types::Dispatch;

/// Twilio Programmable Messaging credentials and sender.
#[derive(Debug, Clone)]
pub struct TwilioOptions {
    /// API origin, `https://api.twilio.com` in production.
    pub base_url: String,
    pub account_sid: String,
    pub auth_token: String,
    /// Sender number in E.164 form.
    pub from: String,
    pub timeout: Duration,
}

/// Sends SMS through the Twilio Messages API.
#[derive(Clone)]
pub struct TwilioSmsDispatcher {
    client: Client,
    options: TwilioOptions,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
}

impl TwilioSmsDispatcher {
    pub fn new(options: TwilioOptions) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(options.timeout)
            .build()
            .context("build twilio http client")?;
        Ok(Self { client, options })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.options.base_url.trim_end_matches('/'),
            self.options.account_sid
        )
    }
}

impl SmsDispatcher for TwilioSmsDispatcher {
    async fn send(&self, to: &str, body: &str) -> anyhow::Result<Dispatch> {
        let form = [("To", to), ("From", self.options.from.as_str()), ("Body", body)];
        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.options.account_sid, Some(&self.options.auth_token))
            .form(&form)
            .send()
            .await
            .context("send twilio message request")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            anyhow::bail!("twilio returned {status}: {detail}");
        }

        let message: MessageResponse = response
            .json()
            .await
            .context("parse twilio message response")?;
        Ok(Dispatch { id: message.sid })
    }
}
