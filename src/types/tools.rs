//! Tool declarations passed through to the model.

use serde::{Deserialize, Serialize};

/// A tool that the model can use.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// Functions the model may call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_declarations: Option<Vec<FunctionDeclaration>>,
    /// Enables code execution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_execution: Option<EmptyToolConfig>,
    /// Enables Google Search grounding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_search: Option<EmptyToolConfig>,
    /// Legacy search retrieval settings, passed through as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_search_retrieval: Option<serde_json::Value>,
}

/// Declaration of a function that the model can call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionDeclaration {
    /// Function name.
    pub name: String,
    /// What the function does.
    #[serde(default)]
    pub description: String,
    /// OpenAPI-subset schema for the arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

/// Marker object for tools that take no settings (`{}` on the wire).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct EmptyToolConfig {}

/// Configuration for tool usage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    /// Function calling settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_calling_config: Option<FunctionCallingConfig>,
}

/// Configuration for function calling behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FunctionCallingConfig {
    /// How the model picks functions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<FunctionCallingMode>,
    /// Restricts `ANY` mode to these functions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_function_names: Option<Vec<String>>,
}

/// Mode for function calling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FunctionCallingMode {
    /// Default value, unused.
    ModeUnspecified,
    /// The model decides whether to call a function.
    Auto,
    /// The model must call a function.
    Any,
    /// The model never calls a function.
    None,
    /// The model decides, and calls are schema-checked.
    Validated,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_accepts_camel_case_input() {
        let tool: Tool = serde_json::from_value(json!({
            "functionDeclarations": [{
                "name": "get_weather",
                "description": "Current weather",
                "parameters": {"type": "object", "properties": {"city": {"type": "string"}}}
            }]
        }))
        .unwrap();

        let declarations = tool.function_declarations.unwrap();
        assert_eq!(declarations[0].name, "get_weather");
        assert!(tool.google_search.is_none());
    }

    #[test]
    fn test_tool_config_wire_shape() {
        let config = ToolConfig {
            function_calling_config: Some(FunctionCallingConfig {
                mode: Some(FunctionCallingMode::Any),
                allowed_function_names: Some(vec!["get_weather".into()]),
            }),
        };

        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            json!({"functionCallingConfig": {"mode": "ANY", "allowedFunctionNames": ["get_weather"]}})
        );
    }
}
