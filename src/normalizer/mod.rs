//! Pure extraction functions over a [`GenerateContentResponse`].
//!
//! Only the first candidate is ever consulted. None of these functions
//! allocate state between calls; calling one twice on the same response
//! yields the same value.

use serde::{Deserialize, Serialize};

use crate::types::{FinishReason, FunctionCall, GenerateContentResponse, Part, SafetyRating};

/// Token counters in the uniform tool-facing shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetrics {
    /// Tokens in the prompt.
    pub prompt_tokens: u32,
    /// Tokens in the candidates.
    pub completion_tokens: u32,
    /// Prompt plus candidate tokens.
    pub total_tokens: u32,
}

impl UsageMetrics {
    /// One-line suffix appended to generated text.
    pub fn summary_line(&self) -> String {
        format!(
            "[usage: prompt={} completion={} total={}]",
            self.prompt_tokens, self.completion_tokens, self.total_tokens
        )
    }
}

/// True when the provider declined to produce content.
pub fn is_blocked(response: &GenerateContentResponse) -> bool {
    match response.first_candidate() {
        None => true,
        Some(candidate) => matches!(
            candidate.finish_reason,
            Some(FinishReason::Safety) | Some(FinishReason::BlockedReasonUnspecified)
        ),
    }
}

/// Human-readable explanation for a blocked or interrupted response.
pub fn block_reason(response: &GenerateContentResponse) -> String {
    let Some(candidate) = response.first_candidate() else {
        let feedback = response.prompt_feedback.as_ref();
        let reason = feedback
            .and_then(|f| f.block_reason.as_ref())
            .map(|r| enum_name(r))
            .unwrap_or_else(|| "no candidates returned".to_string());
        let categories = flagged_categories(feedback.and_then(|f| f.safety_ratings.as_deref()));
        return if categories.is_empty() {
            format!("Prompt blocked ({reason})")
        } else {
            format!("Prompt blocked ({reason}): {categories}")
        };
    };

    match &candidate.finish_reason {
        Some(FinishReason::Safety) | Some(FinishReason::BlockedReasonUnspecified) => {
            let categories = flagged_categories(candidate.safety_ratings.as_deref());
            if categories.is_empty() {
                "Response blocked by safety filters".to_string()
            } else {
                format!("Response blocked by safety filters: {categories}")
            }
        }
        Some(other) => format!("Response stopped unexpectedly ({})", enum_name(other)),
        None => "Response stopped unexpectedly (no finish reason)".to_string(),
    }
}

/// Answer text of the first candidate joined by a blank line.
///
/// Thought summaries are returned separately by [`extract_thoughts`].
pub fn extract_text(response: &GenerateContentResponse) -> String {
    joined_text(response, false)
}

/// Thought summaries of the first candidate, present when `includeThoughts`
/// was requested.
pub fn extract_thoughts(response: &GenerateContentResponse) -> String {
    joined_text(response, true)
}

/// Maps `usageMetadata`, zero-filling missing counters.
pub fn extract_usage(response: &GenerateContentResponse) -> Option<UsageMetrics> {
    response.usage_metadata.as_ref().map(|usage| UsageMetrics {
        prompt_tokens: usage.prompt_token_count.unwrap_or(0),
        completion_tokens: usage.candidates_token_count.unwrap_or(0),
        total_tokens: usage.total_token_count.unwrap_or(0),
    })
}

/// Function calls of the first candidate, in order.
pub fn extract_function_calls(response: &GenerateContentResponse) -> Vec<FunctionCall> {
    first_parts(response)
        .iter()
        .filter_map(|part| match part {
            Part::FunctionCall { function_call } => Some(function_call.clone()),
            _ => None,
        })
        .collect()
}

/// Wire name of the first candidate's finish reason, e.g. `STOP`.
pub fn finish_reason(response: &GenerateContentResponse) -> Option<String> {
    response
        .first_candidate()
        .and_then(|c| c.finish_reason.as_ref())
        .map(enum_name)
}

fn joined_text(response: &GenerateContentResponse, thoughts: bool) -> String {
    first_parts(response)
        .iter()
        .filter_map(|part| match part {
            Part::Text { text, thought } if (*thought == Some(true)) == thoughts => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn first_parts(response: &GenerateContentResponse) -> &[Part] {
    response
        .first_candidate()
        .and_then(|c| c.content.as_ref())
        .map(|content| content.parts.as_slice())
        .unwrap_or(&[])
}

fn flagged_categories(ratings: Option<&[SafetyRating]>) -> String {
    ratings
        .unwrap_or(&[])
        .iter()
        .filter(|r| r.is_flagged())
        .map(|r| r.category.label())
        .collect::<Vec<_>>()
        .join(", ")
}

fn enum_name<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(name)) => name,
        _ => "UNKNOWN".to_string(),
    }
}
