//! Endpoint paths for the Gemini API.
//!
//! Paths are relative to `<base_url>/<api_version>/`; the upload path is
//! relative to `<base_url>/upload/<api_version>/`.

/// Base path for models endpoints.
pub const MODELS: &str = "models";

/// Base path for files endpoints.
pub const FILES: &str = "files";

/// Strips an optional `models/` prefix from a model identifier.
pub fn model_id(model: &str) -> &str {
    model.strip_prefix("models/").unwrap_or(model)
}

/// True when `model` is a bare model id, optionally `models/`-prefixed.
///
/// Ids are spliced into the request path, so only ASCII letters, digits,
/// `-`, `_` and `.` are accepted and `..` is refused.
pub fn is_valid_model_id(model: &str) -> bool {
    let id = model_id(model);
    !id.is_empty()
        && !id.contains("..")
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Fully qualified model resource name (`models/<id>`).
pub fn model_resource(model: &str) -> String {
    format!("{}/{}", MODELS, model_id(model))
}

/// Path for the generateContent endpoint.
///
/// ```
/// use integrations_gemini_mcp::transport::endpoints;
///
/// assert_eq!(
///     endpoints::generate_content("models/gemini-2.5-flash"),
///     "models/gemini-2.5-flash:generateContent"
/// );
/// ```
pub fn generate_content(model: &str) -> String {
    format!("{}:generateContent", model_resource(model))
}

/// Path for the batchEmbedContents endpoint.
pub fn batch_embed_contents(model: &str) -> String {
    format!("{}:batchEmbedContents", model_resource(model))
}

/// Strips an optional `files/` prefix from a file identifier.
pub fn file_id(name: &str) -> &str {
    name.strip_prefix("files/").unwrap_or(name)
}

/// Path for a single file; accepts `abc` or `files/abc`.
pub fn file(name: &str) -> String {
    format!("{}/{}", FILES, file_id(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_id_check() {
        assert!(is_valid_model_id("gemini-2.5-flash"));
        assert!(is_valid_model_id("models/text-embedding-004"));
        assert!(is_valid_model_id("gemini-2.0-flash-exp_01"));
        assert!(!is_valid_model_id("../files/x"));
        assert!(!is_valid_model_id("models/../files/x"));
        assert!(!is_valid_model_id("gemini/other"));
        assert!(!is_valid_model_id("gemini?key=x"));
        assert!(!is_valid_model_id("gemini#frag"));
        assert!(!is_valid_model_id("models/"));
        assert!(!is_valid_model_id(""));
    }

    #[test]
    fn test_model_paths_accept_both_forms() {
        assert_eq!(generate_content("gemini-2.5-flash"), "models/gemini-2.5-flash:generateContent");
        assert_eq!(
            batch_embed_contents("models/text-embedding-004"),
            "models/text-embedding-004:batchEmbedContents"
        );
        assert_eq!(model_resource("text-embedding-004"), "models/text-embedding-004");
    }

    #[test]
    fn test_file_path_normalization() {
        assert_eq!(file("abc123"), "files/abc123");
        assert_eq!(file("files/abc123"), "files/abc123");
        assert_eq!(file_id("files/abc123"), "abc123");
    }
}
