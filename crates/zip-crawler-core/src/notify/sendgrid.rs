use super::{Notifier, NotifyError};
use crate::config::{EmailAddress, NotificationSettings};
use reqwest::blocking::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("zip-crawler/", env!("CARGO_PKG_VERSION"));

/// Sends plain-text mail through the SendGrid v3 `mail/send` API.
pub struct SendGridNotifier {
    client: Client,
    api_url: String,
    api_key: SecretString,
    from_address: String,
    reply_to: String,
}

impl SendGridNotifier {
    pub fn new(settings: &NotificationSettings, api_key: SecretString) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: settings.api_url.clone(),
            api_key,
            from_address: settings.from_address.clone(),
            reply_to: settings.reply_to.clone(),
        })
    }

    fn payload(&self, to: &EmailAddress, subject: &str, body: &str) -> Value {
        json!({
            "personalizations": [{ "to": [{ "email": to.as_str() }] }],
            "from": { "email": self.from_address },
            "reply_to": { "email": self.reply_to },
            "subject": subject,
            "content": [{ "type": "text/plain", "value": body }],
        })
    }
}

impl Notifier for SendGridNotifier {
    fn send(&self, to: &EmailAddress, subject: &str, body: &str) -> Result<(), NotifyError> {
        debug!("POST {}", self.api_url);
        let resp = self
            .client
            .post(&self.api_url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&self.payload(to, subject, body))
            .send()?;

        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(NotifyError::Rejected {
                status: status.as_u16(),
                body: resp.text().unwrap_or_default(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let settings = NotificationSettings {
            from_address: "crawler@example.com".to_string(),
            reply_to: "ops@example.com".to_string(),
            ..NotificationSettings::default()
        };
        let notifier =
            SendGridNotifier::new(&settings, SecretString::from("key".to_string())).unwrap();
        let to = EmailAddress::parse("me@example.com").unwrap();

        let payload = notifier.payload(&to, "Results", "body text");
        assert_eq!(payload["personalizations"][0]["to"][0]["email"], "me@example.com");
        assert_eq!(payload["from"]["email"], "crawler@example.com");
        assert_eq!(payload["reply_to"]["email"], "ops@example.com");
        assert_eq!(payload["subject"], "Results");
        assert_eq!(payload["content"][0]["type"], "text/plain");
        assert_eq!(payload["content"][0]["value"], "body text");
    }
}
