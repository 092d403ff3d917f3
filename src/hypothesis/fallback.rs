//! Static hypotheses used when the service cannot answer

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    MissingApiKey,
    ServiceError,
    EmptyResponse,
}

impl FallbackReason {
    fn headline(&self) -> &'static str {
        match self {
            FallbackReason::MissingApiKey => "Hypothesis service not configured (no API key).",
            FallbackReason::ServiceError => "Hypothesis service unavailable.",
            FallbackReason::EmptyResponse => "Hypothesis service returned no result.",
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FallbackReason::MissingApiKey => "missing_api_key",
            FallbackReason::ServiceError => "service_error",
            FallbackReason::EmptyResponse => "empty_response",
        };
        f.write_str(s)
    }
}

/// Fault categories every fallback covers, one line each
pub const FALLBACK_CAUSES: [&str; 3] = [
    "High vibration → misalignment or bearing wear",
    "High temperature → lubrication or cooling issue",
    "High current → overload or electrical fault",
];

/// Fallback text for `reason`. Depends on nothing else.
pub fn fallback_text(reason: FallbackReason) -> String {
    let mut text = format!("{}\nFallback hypothesis:", reason.headline());
    for cause in FALLBACK_CAUSES {
        text.push_str("\n- ");
        text.push_str(cause);
    }
    text
}
