//! Tool registry behaviour with the built-in tool set.
//!
//! Nothing here reaches the network: network tools are only exercised up
//! to their approval gate or input validation.

use mega_agent::{AgentConfig, AgentError, ToolCall, ToolRegistry};
use serde_json::json;
use tempfile::tempdir;

const BUILT_IN: &[&str] = &[
    "calculator",
    "file_operations",
    "forecast",
    "generate_image",
    "get_time",
    "get_weather",
    "moby",
    "search",
    "system_info",
    "urban_dictionary",
    "weekly_report",
    "wikipedia",
];

async fn registry() -> ToolRegistry {
    ToolRegistry::with_default_tools(&AgentConfig::default()).await
}

#[test]
fn test_tools_are_thread_safe() {
    fn assert_send_sync<T: Send + Sync>() {}

    assert_send_sync::<mega_agent::tools::ForecastTool>();
    assert_send_sync::<mega_agent::tools::CalculatorTool>();
    assert_send_sync::<mega_agent::tools::WebSearchTool>();
    assert_send_sync::<mega_agent::tools::WeeklyReportTool>();
    assert_send_sync::<ToolRegistry>();
}

#[tokio::test]
async fn test_default_tools_registered() {
    let registry = registry().await;
    assert_eq!(registry.tool_names().await, BUILT_IN);

    let prompt = registry.generate_tools_prompt().await;
    for name in BUILT_IN {
        assert!(prompt.contains(&format!("- {}:", name)), "missing {}", name);
    }
    assert!(prompt.contains("Requires approval: always"));
}

#[tokio::test]
async fn test_only_stable_answers_are_cached() {
    let registry = registry().await;
    let mut cached = Vec::new();
    for name in BUILT_IN {
        if registry.get_tool(name).await.unwrap().cacheable() {
            cached.push(*name);
        }
    }
    assert_eq!(
        cached,
        ["calculator", "forecast", "search", "urban_dictionary", "wikipedia"]
    );
}

#[tokio::test]
async fn test_forecast_through_registry() {
    let registry = registry().await;
    let call = ToolCall::new("forecast", json!({"data": [1, 2, 3, 4, 5], "periods": 3}));
    let output = registry.execute(&call).await.unwrap();

    assert!(output.success);
    assert!(output.summary.contains("Linear Regression Forecast for next 3 days"));
    assert!(output.summary.contains("   6, 7, 8\n"));
    assert!(output.summary.contains("Moving Average: 4, 4, 4"));
    assert!(!output.summary.contains("Confidence Intervals"));
}

#[tokio::test]
async fn test_forecast_long_horizon_needs_approval() {
    let registry = registry().await;
    let call = ToolCall::new("forecast", json!({"data": [1, 2, 3], "periods": 8}));

    let err = registry.execute(&call).await.unwrap_err();
    assert!(matches!(err, AgentError::ApprovalRequired(ref name) if name == "forecast"));

    let output = registry.execute(&call.approved()).await.unwrap();
    assert!(output.success);
    assert_eq!(output.data["periods"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn test_always_gated_tools() {
    let registry = registry().await;
    for (name, params) in [
        ("urban_dictionary", json!({"term": "yeet"})),
        ("weekly_report", json!({"username": "octocat"})),
        ("moby", json!({"shopId": "another.myshopify.com"})),
        ("generate_image", json!({"prompt": "explicit scene"})),
        ("wikipedia", json!({"query": "war crimes tribunal"})),
        ("search", json!({"query": "dump private data"})),
    ] {
        let err = registry.execute(&ToolCall::new(name, params)).await.unwrap_err();
        assert!(matches!(err, AgentError::ApprovalRequired(_)), "{} was not gated", name);
    }
}

#[tokio::test]
async fn test_calculator_and_unknown_tool() {
    let registry = registry().await;

    let results = registry
        .execute_parallel(&[
            ToolCall::new("calculator", json!({"expression": "2^3^2"})),
            ToolCall::new("calculator", json!({"expression": "-2^2"})),
            ToolCall::new("teleport", json!({})),
        ])
        .await;

    assert_eq!(results[0].as_ref().unwrap().summary, "2^3^2 = 512");
    assert_eq!(results[1].as_ref().unwrap().summary, "-2^2 = -4");
    let unknown = results[2].as_ref().unwrap();
    assert!(!unknown.success);
    assert_eq!(unknown.error.as_deref(), Some("Unknown tool: teleport"));
}

#[tokio::test]
async fn test_file_operations_through_registry() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("report.txt");
    let path_str = path.to_str().unwrap();
    let registry = registry().await;

    let write = ToolCall::new(
        "file_operations",
        json!({"operation": "write", "filepath": path_str, "content": "q3 numbers"}),
    );
    assert!(matches!(
        registry.execute(&write).await,
        Err(AgentError::ApprovalRequired(_))
    ));
    assert!(registry.execute(&write.approved()).await.unwrap().success);

    let read = ToolCall::new("file_operations", json!({"operation": "read", "filepath": path_str}));
    let first = registry.execute(&read).await.unwrap();
    assert!(first.summary.ends_with("q3 numbers"));

    // not cacheable: a second read sees the new content
    std::fs::write(&path, "q4 numbers").unwrap();
    let second = registry.execute(&read).await.unwrap();
    assert!(second.summary.ends_with("q4 numbers"));
}

#[tokio::test]
async fn test_weather_validation_without_network() {
    let registry = registry().await;
    let output = registry
        .execute(&ToolCall::new("get_weather", json!({"lat": 0, "lon": 200})))
        .await
        .unwrap();
    assert!(!output.success);
    assert_eq!(
        output.summary,
        "Error fetching weather data: Longitude must be between -180 and 180 degrees"
    );
}
