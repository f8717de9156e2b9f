//! Safety-related types for the Gemini API.

use serde::{Deserialize, Serialize};

/// A per-category blocking threshold sent with a request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SafetySetting {
    /// Category the threshold applies to.
    pub category: HarmCategory,
    /// Lowest probability that gets blocked.
    pub threshold: HarmBlockThreshold,
}

/// Harm categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum HarmCategory {
    /// Default value, unused.
    #[serde(rename = "HARM_CATEGORY_UNSPECIFIED")]
    Unspecified,
    /// Harassment.
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    /// Hate speech.
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    /// Sexually explicit content.
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    /// Dangerous content.
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
    /// Content that may undermine civic integrity.
    #[serde(rename = "HARM_CATEGORY_CIVIC_INTEGRITY")]
    CivicIntegrity,
    /// A category this crate does not know yet (response side only).
    #[serde(other, rename = "HARM_CATEGORY_UNKNOWN")]
    Unknown,
}

impl HarmCategory {
    /// Short human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            HarmCategory::Unspecified => "unspecified",
            HarmCategory::Harassment => "harassment",
            HarmCategory::HateSpeech => "hate speech",
            HarmCategory::SexuallyExplicit => "sexually explicit",
            HarmCategory::DangerousContent => "dangerous content",
            HarmCategory::CivicIntegrity => "civic integrity",
            HarmCategory::Unknown => "unknown category",
        }
    }
}

/// Blocking thresholds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    /// Default value, unused.
    HarmBlockThresholdUnspecified,
    /// Block low probability and above.
    BlockLowAndAbove,
    /// Block medium probability and above.
    BlockMediumAndAbove,
    /// Block high probability only.
    BlockOnlyHigh,
    /// Never block.
    BlockNone,
    /// Turn the safety filter off.
    Off,
}

/// A safety rating attached to a prompt or candidate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SafetyRating {
    /// Rated category.
    pub category: HarmCategory,
    /// Probability the content is harmful.
    #[serde(default = "HarmProbability::unspecified")]
    pub probability: HarmProbability,
    /// Set when this rating caused a block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked: Option<bool>,
}

impl SafetyRating {
    /// True when the rating contributed to a block.
    pub fn is_flagged(&self) -> bool {
        self.blocked.unwrap_or(false)
            || matches!(self.probability, HarmProbability::Medium | HarmProbability::High)
    }
}

/// Probability levels for a harm category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmProbability {
    /// Default value, unused.
    HarmProbabilityUnspecified,
    /// Negligible probability.
    Negligible,
    /// Low probability.
    Low,
    /// Medium probability.
    Medium,
    /// High probability.
    High,
    /// A value introduced after this crate was written.
    #[serde(other)]
    Unknown,
}

impl HarmProbability {
    fn unspecified() -> Self {
        HarmProbability::HarmProbabilityUnspecified
    }
}
