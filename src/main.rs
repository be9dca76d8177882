//! Mega Agent command line
//!
//! Lists and runs tools, forecasts series and evaluates expressions, or
//! starts an interactive shell when called without a subcommand.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::io::{self, Write};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use mega_agent::calc::{eval_str, format_value};
use mega_agent::{AgentConfig, AgentError, ToolCall, ToolOutput, ToolRegistry};

#[derive(Parser)]
#[command(name = "mega_agent")]
#[command(about = "Mega Agent - forecasting, calculation and assistant tools", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available tools
    Tools,

    /// Run one tool call
    Run {
        /// Tool name
        tool: String,

        /// Parameters as a JSON object
        #[arg(long, default_value = "{}")]
        params: String,

        /// Approve the call up front if the tool asks for approval
        #[arg(long)]
        approve: bool,
    },

    /// Forecast a numeric series
    Forecast {
        /// Comma-separated observations, oldest first
        #[arg(long, value_delimiter = ',', num_args = 1.., allow_negative_numbers = true)]
        data: Vec<f64>,

        /// Number of periods to forecast (1-12)
        #[arg(long, default_value_t = 5)]
        periods: u64,

        /// Period label: days, weeks or months
        #[arg(long, default_value = "days")]
        interval: String,

        /// Print the structured result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate an arithmetic expression
    Calc {
        /// Expression, e.g. "2 * (3 + 4)"
        #[arg(num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        expression: Vec<String>,
    },
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mega_agent=info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")
}

fn print_output(output: &ToolOutput) {
    let status = if output.success { "✅" } else { "⚠️" };
    println!("{} {}", status, output.summary);
}

async fn list_tools(registry: &ToolRegistry) {
    println!("🔧 Available tools:\n");
    for name in registry.tool_names().await {
        if let Some(tool) = registry.get_tool(&name).await {
            println!("  {:<18} {}", name, tool.description());
            if let Some(note) = tool.approval_note() {
                println!("  {:<18} ⚠️  approval: {}", "", note);
            }
        }
    }
}

fn parse_params(raw: &str) -> Result<Value> {
    let params: Value = serde_json::from_str(raw).context("Parameters must be valid JSON")?;
    anyhow::ensure!(params.is_object(), "Parameters must be a JSON object");
    Ok(params)
}

async fn run_tool(registry: &ToolRegistry, tool: String, params: &str, approve: bool) -> Result<()> {
    let mut call = ToolCall::new(tool, parse_params(params)?);
    call.approved = approve;

    match registry.execute(&call).await {
        Ok(output) => print_output(&output),
        Err(AgentError::ApprovalRequired(name)) => {
            println!("⚠️  '{}' requires approval for this input; re-run with --approve", name);
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} (y/n): ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

async fn repl(registry: &ToolRegistry) -> Result<()> {
    println!("\n{}", "═".repeat(60));
    println!("🚀 Mega Agent v{}", env!("CARGO_PKG_VERSION"));
    println!("{}", "═".repeat(60));
    println!("🔧 Tools: {}", registry.tool_names().await.join(", "));
    println!("\n💡 Commands: 'tools' | 'help' | 'quit' | '<tool> <json params>'\n");

    loop {
        print!("🤖 > ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        match line.to_lowercase().as_str() {
            "quit" | "exit" | "q" => break,
            "tools" => {
                list_tools(registry).await;
                continue;
            }
            "help" => {
                println!("Enter a tool name followed by JSON parameters, e.g.");
                println!("  calculator {{\"expression\": \"2^10\"}}");
                println!("  forecast {{\"data\": [3, 5, 4, 7, 8], \"periods\": 3}}");
                continue;
            }
            _ => {}
        }

        let (name, raw) = line.split_once(char::is_whitespace).unwrap_or((line, "{}"));
        let params = match parse_params(raw.trim()) {
            Ok(p) => p,
            Err(e) => {
                println!("❌ {:#}", e);
                continue;
            }
        };

        let call = ToolCall::new(name, params);
        let result = match registry.execute(&call).await {
            Err(AgentError::ApprovalRequired(_)) => {
                if confirm(&format!("⚠️  '{}' needs approval for this input. Run it?", name))? {
                    registry.execute(&call.approved()).await
                } else {
                    println!("🚫 Skipped.");
                    continue;
                }
            }
            other => other,
        };

        match result {
            Ok(output) => print_output(&output),
            Err(e) => println!("❌ Error: {}", e),
        }
        println!();
    }

    println!("\n👋 Goodbye!\n");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing()?;

    let config = AgentConfig::from_env();

    match cli.command {
        Some(Commands::Calc { expression }) => {
            let expression = expression.join(" ");
            let value = eval_str(&expression).with_context(|| format!("Error calculating \"{}\"", expression))?;
            println!("{} = {}", expression, format_value(value));
        }
        Some(Commands::Forecast { data, periods, interval, json }) => {
            let registry = ToolRegistry::with_default_tools(&config).await;
            let call = ToolCall::new(
                "forecast",
                json!({ "data": data, "periods": periods, "interval": interval }),
            )
            .approved();
            let output = registry.execute(&call).await?;
            if json && output.success {
                println!("{}", serde_json::to_string_pretty(&output.data)?);
            } else {
                println!("{}", output.summary);
            }
        }
        Some(Commands::Tools) => {
            let registry = ToolRegistry::with_default_tools(&config).await;
            list_tools(&registry).await;
        }
        Some(Commands::Run { tool, params, approve }) => {
            let registry = ToolRegistry::with_default_tools(&config).await;
            info!("Running tool {}", tool);
            run_tool(&registry, tool, &params, approve).await?;
        }
        None => {
            let registry = ToolRegistry::with_default_tools(&config).await;
            repl(&registry).await?;
        }
    }

    Ok(())
}
