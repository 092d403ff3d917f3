//! Natural-language fault hypotheses
//!
//! Asks an external text-generation service for a root-cause explanation of
//! a prediction. Whatever goes wrong there, the caller gets a [`Hypothesis`]:
//! failures are logged and replaced by a fixed fallback text.

mod client;
mod config;
mod fallback;

pub use client::{ClientError, GeminiClient, GenerationResponse, API_KEY_HEADER};
pub use config::HypothesisConfig;
pub use fallback::{fallback_text, FallbackReason, FALLBACK_CAUSES};

use crate::health::HealthStatus;
use crate::sensor::SensorReading;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Where a hypothesis text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum HypothesisSource {
    Generated,
    Fallback(FallbackReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hypothesis {
    pub text: String,
    pub source: HypothesisSource,
}

impl Hypothesis {
    pub fn fallback(reason: FallbackReason) -> Self {
        Self {
            text: fallback_text(reason),
            source: HypothesisSource::Fallback(reason),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.source, HypothesisSource::Fallback(_))
    }
}

/// Prompt sent to the service
pub fn build_prompt(reading: &SensorReading, status: HealthStatus, risk: f64) -> String {
    format!(
        "You are an expert mechanical engineer diagnosing pump faults.\n\
         \n\
         Inputs:\n\
         • Vibration: {} mm/s\n\
         • Temperature: {} °C\n\
         • Motor Current: {} A\n\
         • Status: {}\n\
         • Failure Risk: {:.3}\n\
         \n\
         Provide:\n\
         1) Most likely root cause\n\
         2) Mechanical reasoning\n\
         3) 3 recommended maintenance steps\n\
         4) Urgency level\n",
        reading.vibration, reading.temperature, reading.current, status, risk
    )
}

/// Produces hypotheses, with or without a configured service
#[derive(Debug, Clone, Default)]
pub struct HypothesisGenerator {
    client: Option<GeminiClient>,
}

impl HypothesisGenerator {
    /// Build from settings. A client that cannot be constructed is logged
    /// and treated like a missing key.
    pub fn new(config: &HypothesisConfig) -> Self {
        let client = match GeminiClient::from_config(config) {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "Could not build hypothesis client, using fallback text");
                None
            }
        };
        if client.is_none() {
            debug!("Hypothesis service disabled");
        }
        Self { client }
    }

    /// Generator that always returns the missing-key fallback
    pub fn disabled() -> Self {
        Self { client: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Never fails; service problems become a fallback hypothesis.
    pub async fn generate(&self, reading: &SensorReading, status: HealthStatus, risk: f64) -> Hypothesis {
        let Some(client) = &self.client else {
            return Hypothesis::fallback(FallbackReason::MissingApiKey);
        };

        let prompt = build_prompt(reading, status, risk);
        match client.generate(&prompt).await {
            Ok(GenerationResponse::Text(text)) => Hypothesis {
                text,
                source: HypothesisSource::Generated,
            },
            Ok(GenerationResponse::NoResult) => {
                warn!("Hypothesis service returned no text, using fallback");
                Hypothesis::fallback(FallbackReason::EmptyResponse)
            }
            Err(e) => {
                warn!(error = %e, "Hypothesis service failed, using fallback");
                Hypothesis::fallback(FallbackReason::ServiceError)
            }
        }
    }
}
