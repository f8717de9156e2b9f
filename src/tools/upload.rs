//! `gemini_upload_file`: source decoding, content deduplication and upload.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use super::args::UploadFileArgs;
use super::records::{normalize_sha256, FileRecord};
use crate::client::GeminiClient;
use crate::error::{GeminiError, GeminiResult, RequestError, ValidationDetail};
use crate::media::{is_data_uri, mime, parse_data_uri, MediaSource};
use crate::services::{FilesService, MAX_PAGE_SIZE};
use crate::types::{File, FileState};

/// Largest decoded payload the upload tool accepts (50 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Pages of existing files scanned for a duplicate.
const DEDUPE_MAX_PAGES: usize = 10;

/// Uploads `args.source`, or returns an existing file with identical content.
pub(crate) async fn upload_file(
    client: &dyn GeminiClient,
    args: &UploadFileArgs,
    now: DateTime<Utc>,
) -> GeminiResult<FileRecord> {
    let data = load_source(&args.source, &args.mime_type, client.media().as_ref()).await?;
    let digest = hex::encode(Sha256::digest(&data));
    let requested_expiry = args.retention.expiry(now);

    if args.dedupe {
        match find_duplicate(client.files(), &digest, &args.mime_type).await {
            Ok(Some(existing)) => {
                tracing::info!(file = %existing.name, sha256 = %digest, "Reusing existing file with identical content");
                return Ok(FileRecord::from_file(&existing)
                    .with_requested_expiry(requested_expiry)
                    .deduplicated());
            }
            Ok(None) => {}
            Err(err) => tracing::warn!(error = %err, "Duplicate scan failed; uploading anyway"),
        }
    }

    let file = client
        .files()
        .upload(data, &args.mime_type, args.display_name.as_deref())
        .await?;

    let mut record = FileRecord::from_file(&file).with_requested_expiry(requested_expiry);
    record.sha256 = digest;
    if record.mime_type.is_empty() {
        record.mime_type.clone_from(&args.mime_type);
    }
    Ok(record)
}

/// Resolves a URL, `data:` URI or raw base64 source to bytes.
pub(crate) async fn load_source(
    source: &str,
    mime_type: &str,
    media: &dyn MediaSource,
) -> GeminiResult<Bytes> {
    let source = source.trim();
    let lowered = source.get(..8).unwrap_or(source).to_ascii_lowercase();

    if lowered.starts_with("http://") || lowered.starts_with("https://") {
        let fetched = media.fetch(source, Some(mime_type)).await?;
        decode_payload(&fetched.data)
    } else if is_data_uri(source) {
        let uri = parse_data_uri(source)?;
        decode_payload(&uri.data)
    } else {
        decode_payload(source)
    }
}

/// Decodes standard base64, enforcing [`MAX_UPLOAD_BYTES`] before decoding.
pub(crate) fn decode_payload(payload: &str) -> GeminiResult<Bytes> {
    let cleaned: String;
    let payload = if payload.bytes().any(|b| b.is_ascii_whitespace()) {
        cleaned = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        cleaned.as_str()
    } else {
        payload
    };

    check_size(mime::estimated_decoded_len(payload))?;

    let data = STANDARD.decode(payload).map_err(|err| {
        GeminiError::validation(
            "Invalid upload source",
            vec![ValidationDetail::new("source", format!("Source is not valid base64: {err}"))],
        )
    })?;
    check_size(data.len() as u64)?;
    Ok(Bytes::from(data))
}

fn check_size(size: u64) -> GeminiResult<()> {
    if size > MAX_UPLOAD_BYTES {
        return Err(RequestError::PayloadTooLarge {
            size: usize::try_from(size).unwrap_or(usize::MAX),
            max_size: MAX_UPLOAD_BYTES as usize,
        }
        .into());
    }
    Ok(())
}

/// Scans up to [`DEDUPE_MAX_PAGES`] pages for a file with the same digest and
/// MIME type.
pub(crate) async fn find_duplicate(
    files: &dyn FilesService,
    sha256_hex: &str,
    mime_type: &str,
) -> GeminiResult<Option<File>> {
    let mut page_token: Option<String> = None;

    for _ in 0..DEDUPE_MAX_PAGES {
        let page = files.list(Some(MAX_PAGE_SIZE), page_token.as_deref()).await?;
        if let Some(found) = page
            .files
            .into_iter()
            .find(|file| has_content(file, sha256_hex, mime_type))
        {
            return Ok(Some(found));
        }

        match page.next_page_token.filter(|token| !token.is_empty()) {
            Some(next) => page_token = Some(next),
            None => break,
        }
    }
    Ok(None)
}

fn has_content(file: &File, sha256_hex: &str, mime_type: &str) -> bool {
    file.state != Some(FileState::Failed)
        && file
            .mime_type
            .as_deref()
            .is_some_and(|m| m.eq_ignore_ascii_case(mime_type))
        && file
            .sha256_hash
            .as_deref()
            .is_some_and(|hash| normalize_sha256(hash) == sha256_hex)
}
