//! Validation for generateContent requests.

use crate::error::{GeminiError, GeminiResult, ValidationDetail};
use crate::transport::endpoints;
use crate::types::{Content, GenerateContentRequest, GenerationConfig, Part};

/// Validates a request before it is sent.
pub fn validate_generate_request(model: &str, request: &GenerateContentRequest) -> GeminiResult<()> {
    let mut details = Vec::new();

    if model.trim().is_empty() {
        details.push(ValidationDetail::new("model", "Model must not be empty"));
    } else if !endpoints::is_valid_model_id(model) {
        details.push(ValidationDetail::new("model", format!("'{model}' is not a valid model name")));
    }

    if request.contents.is_empty() {
        details.push(ValidationDetail::new("contents", "At least one content turn is required"));
    }
    for (idx, content) in request.contents.iter().enumerate() {
        validate_content(content, &format!("contents[{idx}]"), &mut details);
    }

    if let Some(system) = &request.system_instruction {
        validate_content(system, "systemInstruction", &mut details);
    }

    if let Some(config) = &request.generation_config {
        validate_generation_config(config, &mut details);
    }

    if details.is_empty() {
        Ok(())
    } else {
        Err(GeminiError::validation("Invalid generate content request", details))
    }
}

fn validate_content(content: &Content, field: &str, details: &mut Vec<ValidationDetail>) {
    if content.parts.is_empty() {
        details.push(ValidationDetail::new(
            format!("{field}.parts"),
            "Content must have at least one part",
        ));
    }
    for (idx, part) in content.parts.iter().enumerate() {
        match part {
            Part::InlineData { inline_data } if inline_data.mime_type.is_empty() => {
                details.push(ValidationDetail::new(
                    format!("{field}.parts[{idx}].inlineData.mimeType"),
                    "MIME type must not be empty",
                ));
            }
            Part::FileData { file_data } if file_data.file_uri.is_empty() => {
                details.push(ValidationDetail::new(
                    format!("{field}.parts[{idx}].fileData.fileUri"),
                    "File URI must not be empty",
                ));
            }
            _ => {}
        }
    }
}

fn validate_generation_config(config: &GenerationConfig, details: &mut Vec<ValidationDetail>) {
    if let Some(temperature) = config.temperature {
        if !(0.0..=2.0).contains(&temperature) {
            details.push(ValidationDetail::new(
                "generationConfig.temperature",
                format!("Temperature must be between 0.0 and 2.0, got {temperature}"),
            ));
        }
    }
    if let Some(top_p) = config.top_p {
        if !(0.0..=1.0).contains(&top_p) {
            details.push(ValidationDetail::new(
                "generationConfig.topP",
                format!("top_p must be between 0.0 and 1.0, got {top_p}"),
            ));
        }
    }
    if let Some(top_k) = config.top_k {
        if top_k < 1 {
            details.push(ValidationDetail::new(
                "generationConfig.topK",
                format!("top_k must be at least 1, got {top_k}"),
            ));
        }
    }
    if let Some(max_tokens) = config.max_output_tokens {
        if max_tokens < 1 {
            details.push(ValidationDetail::new(
                "generationConfig.maxOutputTokens",
                format!("max_output_tokens must be at least 1, got {max_tokens}"),
            ));
        }
    }
    if let Some(count) = config.candidate_count {
        if !(1..=8).contains(&count) {
            details.push(ValidationDetail::new(
                "generationConfig.candidateCount",
                format!("candidate_count must be between 1 and 8, got {count}"),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_minimal_request() {
        let request = GenerateContentRequest {
            contents: vec![Content::user(vec![Part::text("hi")])],
            ..Default::default()
        };
        assert!(validate_generate_request("gemini-2.5-flash", &request).is_ok());
    }

    #[test]
    fn test_collects_every_problem() {
        let request = GenerateContentRequest {
            contents: vec![Content::user(vec![])],
            generation_config: Some(GenerationConfig {
                temperature: Some(3.0),
                top_k: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };

        let err = validate_generate_request("", &request).unwrap_err();
        let message = err.to_string();
        assert!(err.is_validation());
        assert!(message.contains("model"));
        assert!(message.contains("contents[0].parts"));
        assert!(message.contains("generationConfig.temperature"));
        assert!(message.contains("generationConfig.topK"));
    }
}
