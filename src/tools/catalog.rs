//! Tool descriptions and argument schemas advertised through `tools/list`.

use serde_json::{json, Value};

use super::args::{MAX_EMBEDDING_TEXTS, MAX_EMBEDDING_TEXT_CHARS, MAX_LIST_PAGE_SIZE, MAX_TTL_SECONDS, MIN_TTL_SECONDS};
use super::{ToolDefinition, ToolKind};

/// The full catalog in [`ToolKind::ALL`] order.
pub(crate) fn definitions() -> Vec<ToolDefinition> {
    ToolKind::ALL.into_iter().map(definition).collect()
}

fn definition(kind: ToolKind) -> ToolDefinition {
    let (description, input_schema) = match kind {
        ToolKind::Generate => (
            "Generate text with a Gemini model from a single prompt. Supports system \
             instructions, generation settings, JSON output via responseSchema, safety \
             settings and thinking budgets.",
            generate_schema(),
        ),
        ToolKind::Messages => (
            "Run a multi-turn, multimodal conversation with a Gemini model. Messages may \
             mix text, image/audio/video URLs, inline base64 data and uploaded file URIs, \
             and may declare functions the model can call.",
            messages_schema(),
        ),
        ToolKind::UploadFile => (
            "Upload a file (URL, data: URI or base64, up to 50 MiB) to the Gemini Files API \
             for use in later messages. Identical content is reused unless dedupe is false.",
            upload_schema(),
        ),
        ToolKind::ListFiles => (
            "List files in the Gemini Files API, optionally filtered by MIME type, display \
             name, creation time or expiry.",
            list_schema(),
        ),
        ToolKind::DeleteFile => (
            "Delete a file from the Gemini Files API.",
            json!({
                "type": "object",
                "properties": {
                    "fileId": {"type": "string", "description": "File id, `abc` or `files/abc`"},
                    "force": {"type": "boolean", "default": false, "description": "Report a missing file as already deleted instead of failing"}
                },
                "required": ["fileId"]
            }),
        ),
        ToolKind::Embeddings => (
            "Compute embedding vectors for up to 2048 texts with a Gemini embedding model. \
             Vectors are returned in input order.",
            embeddings_schema(),
        ),
        ToolKind::GetDocs => (
            "Return usage documentation for the Gemini tools.",
            json!({"type": "object", "properties": {}}),
        ),
    };

    ToolDefinition {
        name: kind.name().to_string(),
        description: description.to_string(),
        input_schema,
    }
}

fn generation_properties() -> serde_json::Map<String, Value> {
    let properties = json!({
        "model": {"type": "string", "description": "Model id, e.g. gemini-2.5-flash"},
        "system": {"type": "string", "description": "System instruction"},
        "generationConfig": {
            "type": "object",
            "properties": {
                "temperature": {"type": "number", "minimum": 0, "maximum": 2},
                "topP": {"type": "number", "minimum": 0, "maximum": 1},
                "topK": {"type": "integer", "minimum": 1},
                "maxOutputTokens": {"type": "integer", "minimum": 1},
                "stopSequences": {"type": "array", "items": {"type": "string"}, "maxItems": 5},
                "candidateCount": {"type": "integer", "minimum": 1},
                "presencePenalty": {"type": "number"},
                "frequencyPenalty": {"type": "number"},
                "seed": {"type": "integer"}
            }
        },
        "responseSchema": {"type": "object", "description": "JSON Schema for structured output; implies responseMimeType application/json"},
        "responseMimeType": {"type": "string", "description": "Output MIME type, e.g. application/json or text/x.enum"},
        "safetySettings": {
            "type": "array",
            "items": {
                "type": "object",
                "properties": {
                    "category": {"type": "string", "enum": [
                        "HARM_CATEGORY_HARASSMENT",
                        "HARM_CATEGORY_HATE_SPEECH",
                        "HARM_CATEGORY_SEXUALLY_EXPLICIT",
                        "HARM_CATEGORY_DANGEROUS_CONTENT",
                        "HARM_CATEGORY_CIVIC_INTEGRITY"
                    ]},
                    "threshold": {"type": "string", "enum": [
                        "BLOCK_NONE",
                        "BLOCK_ONLY_HIGH",
                        "BLOCK_MEDIUM_AND_ABOVE",
                        "BLOCK_LOW_AND_ABOVE",
                        "OFF"
                    ]}
                },
                "required": ["category", "threshold"]
            }
        },
        "thinking": {
            "type": "object",
            "properties": {
                "thinkingBudget": {"type": "integer", "description": "Token budget for reasoning; 0 disables, -1 is dynamic"},
                "includeThoughts": {"type": "boolean"}
            }
        }
    });

    match properties {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}

fn generate_schema() -> Value {
    let mut properties = generation_properties();
    properties.insert(
        "prompt".to_string(),
        json!({"type": "string", "description": "The user prompt"}),
    );
    json!({"type": "object", "properties": properties, "required": ["prompt"]})
}

fn messages_schema() -> Value {
    let reference = |kind: &str| {
        json!({
            "type": "object",
            "properties": {
                "type": {"const": kind},
                "url": {"type": "string", "description": "http(s) URL or data: URI"},
                "mimeType": {"type": "string"}
            },
            "required": ["type", "url"]
        })
    };
    let part = json!({
        "oneOf": [
            {"type": "object", "properties": {"type": {"const": "text"}, "text": {"type": "string"}}, "required": ["type", "text"]},
            reference("image"),
            reference("audio"),
            reference("video"),
            {
                "type": "object",
                "properties": {"type": {"const": "inline_data"}, "data": {"type": "string", "description": "base64"}, "mimeType": {"type": "string"}},
                "required": ["type", "data", "mimeType"]
            },
            {
                "type": "object",
                "properties": {"type": {"const": "file"}, "uri": {"type": "string"}, "mimeType": {"type": "string"}},
                "required": ["type", "uri"]
            }
        ]
    });

    let mut properties = generation_properties();
    properties.insert(
        "messages".to_string(),
        json!({
            "type": "array",
            "minItems": 1,
            "items": {
                "type": "object",
                "properties": {
                    "role": {"type": "string", "enum": ["user", "assistant", "model", "system"]},
                    "content": {"oneOf": [{"type": "string"}, {"type": "array", "items": part}]}
                },
                "required": ["role", "content"]
            }
        }),
    );
    properties.insert(
        "tools".to_string(),
        json!({
            "type": "array",
            "description": "Gemini tools: functionDeclarations, codeExecution, googleSearch",
            "items": {"type": "object"}
        }),
    );
    properties.insert(
        "toolConfig".to_string(),
        json!({
            "type": "object",
            "properties": {
                "functionCallingConfig": {
                    "type": "object",
                    "properties": {
                        "mode": {"type": "string", "enum": ["AUTO", "ANY", "NONE", "VALIDATED"]},
                        "allowedFunctionNames": {"type": "array", "items": {"type": "string"}}
                    }
                }
            }
        }),
    );
    json!({"type": "object", "properties": properties, "required": ["messages"]})
}

fn upload_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "source": {"type": "string", "description": "http(s) URL, data: URI or raw base64"},
            "mimeType": {"type": "string", "description": "IANA media type, e.g. application/pdf"},
            "displayName": {"type": "string"},
            "dedupe": {"type": "boolean", "default": true},
            "retention": {
                "oneOf": [
                    {
                        "type": "object",
                        "properties": {"type": {"const": "persistent"}},
                        "required": ["type"]
                    },
                    {
                        "type": "object",
                        "properties": {
                            "type": {"const": "temporary"},
                            "ttlSeconds": {"type": "integer", "minimum": MIN_TTL_SECONDS, "maximum": MAX_TTL_SECONDS},
                            "expiresAt": {"type": "string", "format": "date-time"}
                        },
                        "required": ["type"]
                    }
                ]
            }
        },
        "required": ["source", "mimeType"]
    })
}

fn list_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "pageSize": {"type": "integer", "minimum": 1, "maximum": MAX_LIST_PAGE_SIZE, "default": 100},
            "pageToken": {"type": "string"},
            "filter": {
                "type": "object",
                "properties": {
                    "mimeTypes": {"type": "array", "items": {"type": "string"}},
                    "displayNameContains": {"type": "string"},
                    "createdAfter": {"type": "string", "format": "date-time"},
                    "createdBefore": {"type": "string", "format": "date-time"},
                    "expired": {"type": "boolean"}
                }
            }
        }
    })
}

fn embeddings_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "texts": {
                "type": "array",
                "minItems": 1,
                "maxItems": MAX_EMBEDDING_TEXTS,
                "items": {"type": "string", "maxLength": MAX_EMBEDDING_TEXT_CHARS}
            },
            "model": {"type": "string", "default": "text-embedding-004"},
            "taskType": {"type": "string", "enum": [
                "TASK_TYPE_UNSPECIFIED",
                "RETRIEVAL_QUERY",
                "RETRIEVAL_DOCUMENT",
                "SEMANTIC_SIMILARITY",
                "CLASSIFICATION",
                "CLUSTERING",
                "QUESTION_ANSWERING",
                "FACT_VERIFICATION",
                "CODE_RETRIEVAL_QUERY"
            ]},
            "truncate": {"type": "string", "enum": ["none", "start", "end"], "default": "none"},
            "outputDimensionality": {"type": "integer", "minimum": 8, "maximum": 3072}
        },
        "required": ["texts"]
    })
}
