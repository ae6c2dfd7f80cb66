//! Domain event fan-out over NATS

use tracing::{debug, warn};

use crate::domain::events::DomainEvent;

const SUBJECT_PREFIX: &str = "inovalog";

/// Publishes to NATS when connected; otherwise events are only logged.
#[derive(Clone, Default)]
pub struct EventPublisher {
    nats: Option<async_nats::Client>,
}

impl EventPublisher {
    pub fn new(nats: Option<async_nats::Client>) -> Self { Self { nats } }

    pub fn disabled() -> Self { Self::default() }

    pub async fn connect(url: Option<&str>) -> Self {
        let Some(url) = url else { return Self::disabled() };
        match async_nats::connect(url).await {
            Ok(client) => Self::new(Some(client)),
            Err(e) => {
                warn!(error = %e, url, "NATS unavailable, events will only be logged");
                Self::disabled()
            }
        }
    }

    pub async fn publish(&self, event: &DomainEvent) {
        let subject = format!("{}.{}", SUBJECT_PREFIX, event.subject());
        let Some(nats) = &self.nats else {
            debug!(%subject, ?event, "domain event");
            return;
        };
        let payload = match serde_json::to_vec(event) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, %subject, "failed to encode domain event");
                return;
            }
        };
        if let Err(e) = nats.publish(subject.clone(), payload.into()).await {
            warn!(error = %e, %subject, "failed to publish domain event");
        }
    }

    pub async fn publish_all(&self, events: impl IntoIterator<Item = DomainEvent>) {
        for event in events {
            self.publish(&event).await;
        }
    }
}
