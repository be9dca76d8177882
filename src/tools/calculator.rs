//! Calculator Tool
//!
//! Evaluates arithmetic through the `calc` parser; nothing is executed
//! dynamically.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{require_str, Tool, ToolOutput};
use crate::calc::{eval_str, format_value};
use crate::error::AgentResult;

#[derive(Default)]
pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> String {
        "calculator".to_string()
    }

    fn description(&self) -> String {
        "Perform mathematical calculations. Supports + - * / % ^, parentheses, \
         constants pi and e, and functions such as sqrt, sin, cos, ln, log, min and max."
            .to_string()
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "Mathematical expression to evaluate (e.g., \"2 + 2\", \"sqrt(16)\", \"sin(pi / 6)\")"
                }
            },
            "required": ["expression"]
        })
    }

    async fn execute(&self, params: Value) -> AgentResult<ToolOutput> {
        let expression = require_str(&params, "expression")?;
        debug!("Evaluating expression: {}", expression);

        match eval_str(expression) {
            Ok(value) => Ok(ToolOutput::success(
                json!({ "expression": expression, "result": value }),
                format!("{} = {}", expression, format_value(value)),
            )),
            Err(e) => Ok(ToolOutput::failure(format!(
                "Error calculating \"{}\": {}",
                expression, e
            ))),
        }
    }
}
