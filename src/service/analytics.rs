//! Product analytics capture.
//!
//! [`Analytics`] is chosen once at startup by [`from_settings`]: a PostHog
//! client when `POSTHOG_API_KEY` is set, otherwise [`NoopAnalytics`].
//! Callers always hold an `Arc<dyn Analytics>` and never check whether
//! analytics are configured.

use std::fmt::Debug;
use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value, json};

use crate::config::{Secret, Settings};

/// One analytics event.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsEvent {
    /// Event name, e.g. `api_request`.
    pub name: String,
    /// User id, or `anonymous`.
    pub distinct_id: String,
    /// Free-form event properties.
    pub properties: Map<String, Value>,
}

impl AnalyticsEvent {
    /// Creates an event with no properties.
    #[must_use]
    pub fn new(name: impl Into<String>, distinct_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            distinct_id: distinct_id.into(),
            properties: Map::new(),
        }
    }

    /// Adds a property.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }
}

/// Sink for analytics events. Capture never blocks the caller.
pub trait Analytics: Debug + Send + Sync {
    /// Records an event.
    fn capture(&self, event: AnalyticsEvent);

    /// Attaches properties to a user profile.
    fn identify(&self, distinct_id: &str, properties: Map<String, Value>) {
        let mut event = AnalyticsEvent::new("$identify", distinct_id);
        event.properties.insert("$set".to_string(), Value::Object(properties));
        self.capture(event);
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAnalytics;

impl Analytics for NoopAnalytics {
    fn capture(&self, _event: AnalyticsEvent) {}
}

/// Sends events to a PostHog ingestion endpoint.
#[derive(Debug, Clone)]
pub struct PostHogAnalytics {
    client: reqwest::Client,
    endpoint: String,
    api_key: Secret,
}

impl PostHogAnalytics {
    /// Creates a client for `host` using project key `api_key`.
    #[must_use]
    pub fn new(host: &str, api_key: Secret) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/capture/", host.trim_end_matches('/')),
            api_key,
        }
    }

    /// Capture endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn payload(&self, event: &AnalyticsEvent) -> Value {
        json!({
            "api_key": self.api_key.expose(),
            "event": event.name,
            "distinct_id": event.distinct_id,
            "properties": event.properties,
            "timestamp": Utc::now().to_rfc3339(),
        })
    }
}

impl Analytics for PostHogAnalytics {
    fn capture(&self, event: AnalyticsEvent) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!(event = %event.name, "no runtime; analytics event dropped");
            return;
        };
        let request = self.client.post(&self.endpoint).json(&self.payload(&event));
        runtime.spawn(async move {
            match request.send().await {
                Ok(resp) if !resp.status().is_success() => {
                    tracing::debug!(event = %event.name, status = %resp.status(), "analytics capture rejected");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(event = %event.name, error = %e, "analytics capture failed");
                }
            }
        });
    }
}

/// Selects the analytics implementation for these settings.
#[must_use]
pub fn from_settings(settings: &Settings) -> Arc<dyn Analytics> {
    match &settings.posthog_api_key {
        Some(key) => {
            tracing::info!(host = %settings.posthog_host, "analytics enabled");
            Arc::new(PostHogAnalytics::new(&settings.posthog_host, key.clone()))
        }
        None => Arc::new(NoopAnalytics),
    }
}
