//! Tool protocol abstraction layer.
//!
//! Defines the vocabulary shared by the tool host and the chat front end:
//! tool descriptors ([`ToolMetadata`] with typed [`ToolParameter`]s), the
//! [`ToolResult`] payload every invocation produces, and the
//! [`ToolProtocol`] trait implemented by each tool family on the host side.
//!
//! # Architecture
//!
//! ```text
//! SessionChannel → HTTP → UnifiedToolServer → ToolProtocol (trait) → tools
//! ```
//!
//! Descriptors travel over the wire as plain JSON, so both processes share
//! these types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::error::Error;
use std::fmt;

/// Represents the result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the tool execution was successful.
    pub success: bool,
    /// The output data from the tool.
    pub output: serde_json::Value,
    /// Optional error message if execution failed.
    pub error: Option<String>,
}

impl ToolResult {
    /// Convenience constructor for successful tool execution.
    pub fn success(output: serde_json::Value) -> Self {
        Self {
            success: true,
            output,
            error: None,
        }
    }

    /// Convenience constructor for failed tool execution.
    pub fn failure(error: String) -> Self {
        Self {
            success: false,
            output: serde_json::Value::Null,
            error: Some(error),
        }
    }

    /// Render the result into the text form folded into the conversation:
    /// the output JSON on success, the error description on failure.
    pub fn into_content(self) -> String {
        if self.success {
            self.output.to_string()
        } else {
            format!(
                "Error: {}",
                self.error.unwrap_or_else(|| "unknown tool failure".to_string())
            )
        }
    }
}

/// Defines the type of a tool parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ToolParameterType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

/// Defines a parameter for a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ToolParameterType,
    pub description: Option<String>,
    pub required: bool,
    /// For array types, specifies the type of items.
    pub items: Option<Box<ToolParameterType>>,
}

impl ToolParameter {
    /// Define a new tool parameter with the provided name and type.
    pub fn new(name: impl Into<String>, param_type: ToolParameterType) -> Self {
        Self {
            name: name.into(),
            param_type,
            description: None,
            required: false,
            items: None,
        }
    }

    /// Add a human readable description that will surface in generated schemas.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the argument as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// For array parameters, declare the type of the contained items.
    pub fn with_items(mut self, item_type: ToolParameterType) -> Self {
        self.items = Some(Box::new(item_type));
        self
    }
}

/// Metadata about a tool: the descriptor the host reports at discovery time
/// and the translator maps 1:1 into the model's schema format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolMetadata {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ToolParameter>,
}

impl ToolMetadata {
    /// Create metadata with the supplied identifier and description.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    /// Append a parameter definition to the tool metadata.
    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }

    /// Render the declared parameters into a JSON-schema object of the shape
    /// the function-calling API expects.
    pub fn input_schema(&self) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();

        for param in &self.parameters {
            let mut prop = json!({
                "type": param.param_type,
                "description": param.description.as_deref().unwrap_or(""),
            });
            if let Some(items) = &param.items {
                prop["items"] = json!({ "type": items });
            }
            properties.insert(param.name.clone(), prop);
            if param.required {
                required.push(param.name.clone());
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// Error types for tool operations on the host side.
#[derive(Debug, Clone)]
pub enum ToolError {
    /// Requested tool is not registered with the current protocol.
    NotFound(String),
    /// Tool execution completed with an application level failure.
    ExecutionFailed(String),
    /// The provided JSON parameters failed validation or deserialization.
    InvalidParameters(String),
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolError::NotFound(name) => write!(f, "Tool not found: {}", name),
            ToolError::ExecutionFailed(msg) => write!(f, "Tool execution failed: {}", msg),
            ToolError::InvalidParameters(msg) => write!(f, "Invalid parameters: {}", msg),
        }
    }
}

impl Error for ToolError {}

/// Trait for implementing tool execution protocols on the host side.
#[async_trait]
pub trait ToolProtocol: Send + Sync {
    /// Execute a tool with the given parameters.
    async fn execute(
        &self,
        tool_name: &str,
        parameters: serde_json::Value,
    ) -> Result<ToolResult, Box<dyn Error + Send + Sync>>;

    /// Get metadata about available tools.
    async fn list_tools(&self) -> Result<Vec<ToolMetadata>, Box<dyn Error + Send + Sync>>;

    /// Protocol identifier (e.g. "typechart", "pokedex").
    fn protocol_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_parameter_builder() {
        let param = ToolParameter::new("attacking_type", ToolParameterType::String)
            .with_description("The attacking move's type")
            .required();

        assert_eq!(param.name, "attacking_type");
        assert_eq!(param.param_type, ToolParameterType::String);
        assert_eq!(
            param.description,
            Some("The attacking move's type".to_string())
        );
        assert!(param.required);
    }

    #[test]
    fn test_input_schema_rendering() {
        let metadata = ToolMetadata::new("get_type_effectiveness", "Type chart lookup")
            .with_parameter(
                ToolParameter::new("attacking_type", ToolParameterType::String).required(),
            )
            .with_parameter(
                ToolParameter::new("defending_types", ToolParameterType::Array)
                    .with_items(ToolParameterType::String)
                    .required(),
            )
            .with_parameter(ToolParameter::new("context", ToolParameterType::String));

        let schema = metadata.input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["attacking_type"]["type"], "string");
        assert_eq!(
            schema["properties"]["defending_types"]["items"]["type"],
            "string"
        );
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(required, vec!["attacking_type", "defending_types"]);
    }

    #[test]
    fn test_failure_result_renders_error_content() {
        let result = ToolResult::failure("no such species".to_string());
        assert_eq!(result.into_content(), "Error: no such species");
    }
}
