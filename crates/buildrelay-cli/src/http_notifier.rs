// buildrelay-cli/src/http_notifier.rs
// ============================================================================
// Module: HTTP Notifier
// Description: Generic HTTP delivery adapter.
// Purpose: POST matched events and bindings to a configured endpoint.
// Dependencies: buildrelay-core, async-trait, reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! The HTTP notifier POSTs one JSON document per matched event, shaped as
//! `{"event": ..., "bindings": ...}`, to the endpoint named by the
//! `delivery.url` field. An optional `delivery.token` field supplies a
//! bearer token, either inline or through the `{secretRef: <alias>}`
//! convention; secret-backed tokens are resolved once at set-up.
//! Invariants:
//! - Set-up validates the whole delivery schema and fails fast; `send` is
//!   never reached on a partially-configured adapter.
//! - Redirects are refused; a moved endpoint fails the delivery.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use buildrelay_core::BuildEvent;
use buildrelay_core::DeliveryError;
use buildrelay_core::DeliveryValue;
use buildrelay_core::Notifier;
use buildrelay_core::SecretAliases;
use buildrelay_core::SecretFetcher;
use buildrelay_core::SetUpError;
use reqwest::Client;
use reqwest::redirect::Policy;
use url::Url;

// ============================================================================
// SECTION: HTTP Notifier
// ============================================================================

/// Outbound request timeout applied by the adapter's own client.
const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Endpoint configuration resolved during set-up.
#[derive(Debug, Clone)]
struct Endpoint {
    /// Destination URL for event documents.
    url: Url,
    /// Optional bearer token attached to every request.
    token: Option<String>,
    /// Client used for outbound sends.
    client: Client,
}

/// Generic HTTP delivery adapter.
#[derive(Debug, Default)]
pub struct HttpNotifier {
    /// Populated by a successful set-up.
    endpoint: Option<Endpoint>,
}

impl HttpNotifier {
    /// Creates an adapter awaiting set-up.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            endpoint: None,
        }
    }

    /// Extracts and validates the `delivery.url` field.
    fn parse_url(delivery: &BTreeMap<String, DeliveryValue>) -> Result<Url, SetUpError> {
        let value = delivery
            .get("url")
            .ok_or_else(|| SetUpError::MissingField("url".to_string()))?;
        let text = value.as_text().ok_or_else(|| SetUpError::InvalidField {
            field: "url".to_string(),
            reason: "must be a string".to_string(),
        })?;
        let url = Url::parse(text).map_err(|err| SetUpError::InvalidField {
            field: "url".to_string(),
            reason: err.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(SetUpError::InvalidField {
                field: "url".to_string(),
                reason: format!("unsupported scheme `{scheme}`"),
            }),
        }
    }

    /// Extracts the optional `delivery.token` field, resolving secret
    /// references through the alias table.
    fn parse_token(
        delivery: &BTreeMap<String, DeliveryValue>,
        aliases: &SecretAliases,
        fetcher: &dyn SecretFetcher,
    ) -> Result<Option<String>, SetUpError> {
        let Some(value) = delivery.get("token") else {
            return Ok(None);
        };
        if let Some(alias) = value.as_secret_ref() {
            return Ok(Some(aliases.value(alias, fetcher)?));
        }
        if let Some(text) = value.as_text() {
            return Ok(Some(text.to_string()));
        }
        Err(SetUpError::InvalidField {
            field: "token".to_string(),
            reason: "must be a string or {secretRef: <alias>}".to_string(),
        })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    fn set_up(
        &mut self,
        delivery: &BTreeMap<String, DeliveryValue>,
        aliases: &SecretAliases,
        fetcher: &dyn SecretFetcher,
    ) -> Result<(), SetUpError> {
        let url = Self::parse_url(delivery)?;
        let token = Self::parse_token(delivery, aliases, fetcher)?;
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(SEND_TIMEOUT)
            .build()
            .map_err(|err| SetUpError::InvalidField {
                field: "url".to_string(),
                reason: format!("http client construction failed: {err}"),
            })?;
        self.endpoint = Some(Endpoint {
            url,
            token,
            client,
        });
        Ok(())
    }

    async fn send(
        &self,
        event: &BuildEvent,
        bindings: &BTreeMap<String, String>,
    ) -> Result<(), DeliveryError> {
        let endpoint = self
            .endpoint
            .as_ref()
            .ok_or_else(|| DeliveryError::Failed("adapter was not set up".to_string()))?;
        let document = serde_json::json!({
            "event": event,
            "bindings": bindings,
        });
        let mut request = endpoint.client.post(endpoint.url.clone()).json(&document);
        if let Some(token) = &endpoint.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(|err| {
            if err.is_timeout() {
                DeliveryError::Timeout
            } else {
                DeliveryError::Failed(err.to_string())
            }
        })?;
        if !response.status().is_success() {
            return Err(DeliveryError::Failed(format!(
                "destination returned http status {}",
                response.status()
            )));
        }
        Ok(())
    }
}
