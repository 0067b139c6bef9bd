//! # Telemetry
//!
//! Logging subscriber setup and moniker rendering for log lines.
//!
//! `RUST_LOG` wins over the configured level. Monikers are only used when
//! the service renders dispatch summaries; dispatch itself never reads them.

use crate::config::{LoggingConfig, MonikerConfig};
use crate::ports::ObjectModelProvider;
use lrc_types::{InteractionClassHandle, Message, ObjectClassHandle, Payload};
use std::sync::Arc;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    Init(String),
}

/// Install the global tracing subscriber.
///
/// Fails if the filter does not parse or a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| TelemetryError::Init(e.to_string()))?;

    if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
            .map_err(|e| TelemetryError::Init(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::Init(e.to_string()))?;
    }

    tracing::info!(
        level = %config.log_level,
        json = config.json_logs,
        "[lrc] Logging initialized"
    );
    Ok(())
}

/// Renders class identifiers for log lines, as names or raw handles.
#[derive(Clone)]
pub struct Monikers {
    print_handles: bool,
    model: Arc<dyn ObjectModelProvider>,
}

impl Monikers {
    #[must_use]
    pub fn new(config: &MonikerConfig, model: Arc<dyn ObjectModelProvider>) -> Self {
        Self {
            print_handles: config.print_handles,
            model,
        }
    }

    pub fn object_class(&self, class: ObjectClassHandle) -> String {
        if self.print_handles {
            return class.to_string();
        }
        self.model
            .object_class(class)
            .map(|info| info.name)
            .unwrap_or_else(|| class.to_string())
    }

    pub fn interaction_class(&self, class: InteractionClassHandle) -> String {
        if self.print_handles {
            return class.to_string();
        }
        self.model
            .interaction_class(class)
            .map(|info| info.name)
            .unwrap_or_else(|| class.to_string())
    }

    /// One-line summary of a message: kind plus the class it concerns.
    pub fn summary(&self, message: &Message) -> String {
        let subject = match message.payload() {
            Payload::PublishObjectClass { class, .. }
            | Payload::UnpublishObjectClass { class }
            | Payload::SubscribeObjectClass { class, .. }
            | Payload::UnsubscribeObjectClass { class }
            | Payload::RegisterObject { class, .. }
            | Payload::UpdateAttributes { class, .. } => Some(self.object_class(*class)),
            Payload::PublishInteractionClass { class }
            | Payload::UnpublishInteractionClass { class }
            | Payload::SubscribeInteractionClass { class, .. }
            | Payload::UnsubscribeInteractionClass { class }
            | Payload::SendInteraction { class, .. } => Some(self.interaction_class(*class)),
            _ => None,
        };
        match subject {
            Some(subject) => format!("{}({subject})", message.kind()),
            None => message.kind().to_string(),
        }
    }
}
