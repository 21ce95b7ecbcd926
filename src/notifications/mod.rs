//! Owner notifications for new lease requests.
//!
//! A [`LeaseNotice`] is composed after a lease is committed and handed to a
//! [`Notifier`] by the event loop. Owners without an email address are skipped.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::entities::{lease, owner, property};

/// Header carrying the hex HMAC-SHA256 of `"{timestamp}.{body}"`.
pub const SIGNATURE_HEADER: &str = "X-Realty-Signature";
pub const TIMESTAMP_HEADER: &str = "X-Realty-Timestamp";

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Webhook rejected notification with status {0}")]
    Rejected(u16),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Signature error: {0}")]
    Signature(String),
}

/// Everything the owner needs to hear about a new lease request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseNotice {
    pub lease_id: Uuid,
    pub property_id: Uuid,
    pub property_title: String,
    pub owner_name: String,
    pub owner_email: Option<String>,
    pub owner_telephone: Option<String>,
    pub tenant_name: String,
    pub tenant_phone: Option<String>,
    pub tenant_email: Option<String>,
    pub tenant_notes: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl LeaseNotice {
    pub fn new(lease: &lease::Model, property: &property::Model, owner: &owner::Model) -> Self {
        Self {
            lease_id: lease.id,
            property_id: property.id,
            property_title: property.title.clone(),
            owner_name: owner.full_name.clone(),
            owner_email: owner.email.clone().filter(|e| !e.trim().is_empty()),
            owner_telephone: owner.telephone.clone(),
            tenant_name: lease.tenant_name.clone(),
            tenant_phone: lease.tenant_phone.clone(),
            tenant_email: lease.tenant_email.clone(),
            tenant_notes: lease.tenant_notes.clone(),
            start_date: lease.start_date,
            end_date: lease.end_date,
        }
    }

    pub fn subject(&self) -> String {
        format!("New lease request for '{}'", self.property_title)
    }

    pub fn body(&self) -> String {
        fn or_na(value: &Option<String>) -> &str {
            value.as_deref().filter(|v| !v.is_empty()).unwrap_or("N/A")
        }

        let owner_name = if self.owner_name.trim().is_empty() {
            "Owner"
        } else {
            self.owner_name.as_str()
        };

        format!(
            "Hello {owner_name},\n\n\
             A new lease request has been submitted for your property '{title}'.\n\n\
             Tenant details:\n\
             Name: {name}\n\
             Phone: {phone}\n\
             Email: {email}\n\
             Notes: {notes}\n\n\
             Sign in to your dashboard to review and manage the request.\n",
            title = self.property_title,
            name = self.tenant_name,
            phone = or_na(&self.tenant_phone),
            email = or_na(&self.tenant_email),
            notes = or_na(&self.tenant_notes),
        )
    }
}

/// Message handed to a delivery channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub notice: LeaseNotice,
}

impl OutboundMessage {
    pub fn new(to: impl Into<String>, notice: &LeaseNotice) -> Self {
        Self {
            to: to.into(),
            subject: notice.subject(),
            body: notice.body(),
            notice: notice.clone(),
        }
    }
}

/// Delivery channel for owner notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), NotificationError>;
}

/// Delivers `notice` to its owner. Returns `false` when the owner has no email.
pub async fn notify_owner(
    notifier: &dyn Notifier,
    notice: &LeaseNotice,
) -> Result<bool, NotificationError> {
    let Some(to) = notice.owner_email.as_deref() else {
        debug!(lease_id = %notice.lease_id, "Owner has no email address, skipping notification");
        return Ok(false);
    };

    notifier.deliver(&OutboundMessage::new(to, notice)).await?;
    Ok(true)
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), NotificationError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            lease_id = %message.notice.lease_id,
            "Lease request notification"
        );
        Ok(())
    }
}

/// HMAC signature generator for webhook authentication
pub struct SignatureGenerator {
    secret: String,
}

impl SignatureGenerator {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    pub fn sign_payload(&self, timestamp: &str, body: &str) -> Result<String, NotificationError> {
        use hmac::{Hmac, Mac};
        use sha2::Sha256;

        type HmacSha256 = Hmac<Sha256>;

        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| NotificationError::Signature(e.to_string()))?;
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(body.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

/// POSTs each message as JSON to a configured endpoint. One attempt per message.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    signer: Option<SignatureGenerator>,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, secret: Option<String>) -> Result<Self, NotificationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
            signer: secret.filter(|s| !s.is_empty()).map(SignatureGenerator::new),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    #[instrument(skip(self, message), fields(lease_id = %message.notice.lease_id))]
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), NotificationError> {
        let body = serde_json::to_string(message)?;
        let timestamp = Utc::now().to_rfc3339();

        let mut request = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .header(TIMESTAMP_HEADER, &timestamp)
            .body(body.clone());

        if let Some(signer) = &self.signer {
            request = request.header(SIGNATURE_HEADER, signer.sign_payload(&timestamp, &body)?);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            warn!(status = %response.status(), url = %self.url, "Webhook rejected notification");
            return Err(NotificationError::Rejected(response.status().as_u16()));
        }

        info!(url = %self.url, "Webhook notification delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{City, PropertyType};
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    fn fixtures(owner_email: Option<&str>) -> LeaseNotice {
        let owner = owner::Model {
            id: Uuid::new_v4(),
            user_id: None,
            full_name: "Jane".into(),
            email: owner_email.map(str::to_string),
            telephone: None,
            created_at: Utc::now(),
        };
        let property = property::Model {
            id: Uuid::new_v4(),
            owner_id: owner.id,
            title: "Villa Bonapriso".into(),
            address: "Rue 1".into(),
            city: City::Douala,
            surface_area_m2: 120,
            monthly_rent: dec!(50000),
            property_type: PropertyType::House,
            disponible: false,
            exige_validation_contrat: false,
            created_at: Utc::now(),
        };
        let lease = lease::Model {
            id: Uuid::new_v4(),
            property_id: property.id,
            tenant_name: "Tom".into(),
            tenant_phone: None,
            tenant_email: Some("tom@example.com".into()),
            tenant_notes: None,
            start_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            deposit: dec!(10000),
            active: true,
        };
        LeaseNotice::new(&lease, &property, &owner)
    }

    #[derive(Default)]
    struct Recording(Mutex<Vec<OutboundMessage>>);

    #[async_trait]
    impl Notifier for Recording {
        async fn deliver(&self, message: &OutboundMessage) -> Result<(), NotificationError> {
            self.0.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    #[test]
    fn notice_text_uses_placeholders_for_missing_fields() {
        let notice = fixtures(Some("jane@example.com"));
        assert_eq!(notice.subject(), "New lease request for 'Villa Bonapriso'");

        let body = notice.body();
        assert!(body.starts_with("Hello Jane,"));
        assert!(body.contains("Name: Tom\n"));
        assert!(body.contains("Phone: N/A\n"));
        assert!(body.contains("Email: tom@example.com\n"));
        assert!(body.contains("Notes: N/A\n"));
    }

    #[tokio::test]
    async fn owner_without_email_is_skipped() {
        let recorder = Recording::default();
        assert!(!notify_owner(&recorder, &fixtures(None)).await.unwrap());
        assert!(!notify_owner(&recorder, &fixtures(Some("  "))).await.unwrap());
        assert!(recorder.0.lock().unwrap().is_empty());

        assert!(notify_owner(&recorder, &fixtures(Some("jane@example.com")))
            .await
            .unwrap());
        let sent = recorder.0.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "jane@example.com");
    }

    #[test]
    fn signature_is_hex_sha256() {
        let signer = SignatureGenerator::new("test_secret".to_string());
        let sig = signer
            .sign_payload("2026-01-01T00:00:00Z", r#"{"to":"x"}"#)
            .unwrap();
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(
            sig,
            signer
                .sign_payload("2026-01-01T00:00:01Z", r#"{"to":"x"}"#)
                .unwrap()
        );
    }
}
