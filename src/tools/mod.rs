//! Tool System Module
//!
//! Structured tool calling with JSON schema definitions. These are the
//! operations the external planner invokes, turn by turn, to ground its
//! scheduling reasoning in warehouse data.

mod clock;
mod forecast;
mod imagery;
mod incidents;
mod schedule;

pub use clock::{CurrentTimeTool, WeekendCheckTool};
pub use forecast::PassengerForecastTool;
pub use imagery::ImageUrlTool;
pub use incidents::UnresolvedIncidentsTool;
pub use schedule::{ScheduleMaintenanceTool, SchedulePolicy};

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

/// Output from a tool execution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolOutput {
    /// Whether the tool execution was successful
    pub success: bool,
    /// The output data (can be string, JSON object, etc.)
    pub data: Value,
    /// Human-readable summary of the output
    pub summary: String,
    /// Optional error message if success is false
    pub error: Option<String>,
}

impl ToolOutput {
    /// Create a successful output
    pub fn success(data: impl Into<Value>, summary: impl Into<String>) -> Self {
        Self {
            success: true,
            data: data.into(),
            summary: summary.into(),
            error: None,
        }
    }

    /// Create a successful output with string data
    pub fn success_str(content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            success: true,
            summary: content.clone(),
            data: Value::String(content),
            error: None,
        }
    }

    /// Create a failed output
    pub fn failure(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            success: false,
            data: Value::Null,
            summary: format!("Error: {}", error),
            error: Some(error),
        }
    }
}

/// A tool call request parsed from planner output
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub struct ToolCall {
    /// Name of the tool to call
    pub name: String,
    /// Parameters for the tool
    pub parameters: Value,
}

/// Trait for operations the planner can invoke
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the unique name of the tool
    fn name(&self) -> String;

    /// Get a description of what the tool does
    fn description(&self) -> String;

    /// Get the JSON schema for the tool's parameters
    fn parameters(&self) -> Value;

    /// Execute the tool with the given parameters
    async fn execute(&self, params: Value) -> Result<ToolOutput>;
}

/// Registry for available tools
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            tools: RwLock::new(HashMap::new()),
        }
    }

    /// Register a tool instance
    pub async fn register_instance<T: Tool + 'static>(&self, tool: T) {
        let mut tools = self.tools.write().await;
        tools.insert(tool.name(), Arc::new(tool));
    }

    /// Get all tool names
    pub async fn tool_names(&self) -> Vec<String> {
        let tools = self.tools.read().await;
        let mut names: Vec<_> = tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get a specific tool by name
    pub async fn get_tool(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let tools = self.tools.read().await;
        tools.get(name).cloned()
    }

    /// Generate a combined schema for all tools (for the planner prompt)
    pub async fn generate_tools_prompt(&self) -> String {
        let tools = self.tools.read().await;
        if tools.is_empty() {
            return "No tools available for this task.\n".to_string();
        }

        let mut names: Vec<_> = tools.keys().collect();
        names.sort();

        let mut prompt = String::from("Available Tools:\n\n");
        for name in names {
            let tool = &tools[name];
            prompt.push_str(&format!(
                "- {}: {} (params: {})\n",
                name,
                tool.description(),
                serde_json::to_string(&tool.parameters()).unwrap_or_default()
            ));
        }
        prompt
    }

    /// Execute a tool call
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolOutput> {
        let tool = {
            let tools = self.tools.read().await;
            tools.get(&call.name).cloned()
        };

        match tool {
            Some(tool) => tool.execute(call.parameters.clone()).await,
            None => Ok(ToolOutput::failure(format!("Unknown tool: {}", call.name))),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct MockTool;

    #[async_trait]
    impl Tool for MockTool {
        fn name(&self) -> String {
            "mock_tool".to_string()
        }
        fn description(&self) -> String {
            "A mock tool for testing".to_string()
        }
        fn parameters(&self) -> Value {
            json!({"type": "object"})
        }
        async fn execute(&self, params: Value) -> Result<ToolOutput> {
            Ok(ToolOutput::success(params, "Mock execution successful"))
        }
    }

    #[tokio::test]
    async fn test_tool_registration() {
        let registry = ToolRegistry::new();
        registry.register_instance(MockTool).await;

        let names = registry.tool_names().await;
        assert!(names.contains(&"mock_tool".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_a_failure_payload() {
        let registry = ToolRegistry::new();
        let call = ToolCall {
            name: "missing".to_string(),
            parameters: json!({}),
        };
        let output = registry.execute(&call).await.unwrap();
        assert!(!output.success);
        assert!(output.error.unwrap().contains("Unknown tool"));
    }

    #[tokio::test]
    async fn test_generate_tools_prompt() {
        let registry = ToolRegistry::new();
        registry.register_instance(MockTool).await;

        let prompt = registry.generate_tools_prompt().await;
        assert!(prompt.contains("mock_tool"));
        assert!(prompt.contains("A mock tool for testing"));
    }
}
