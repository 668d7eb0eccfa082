//! Interactive harness for the decision-support engine.
//!
//! Runs the orchestrator locally (mock mode by default) and lets a
//! human play the planner: type a tool name followed by a JSON
//! parameter object and see the structured payload the planner would.

use std::io::{self, Write};

use anyhow::Result;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use transit_agency::{Config, Orchestrator, ToolCall};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config = Config::from_env();
    info!(mode = ?config.mode, "Starting the maintenance agency core");

    println!("\n{}", "═".repeat(60));
    println!("🚌 Transit Maintenance Agency v0.2.0 ({:?} mode)", config.mode);
    println!("{}", "═".repeat(60));

    let orchestrator = Orchestrator::new(config).await;
    let mut session = orchestrator.open_session();

    println!("{}", orchestrator.registry().generate_tools_prompt().await);
    println!("💡 Usage: <tool_name> [json params] | 'artifacts' | 'quit'\n");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }
        if line == "artifacts" {
            println!("{}", serde_json::to_string_pretty(&session.artifacts())?);
            continue;
        }

        let (name, params_raw) = match line.split_once(' ') {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };
        let parameters = if params_raw.is_empty() {
            json!({})
        } else {
            match serde_json::from_str(params_raw) {
                Ok(v) => v,
                Err(e) => {
                    println!("Parameters must be a JSON object: {e}");
                    continue;
                }
            }
        };

        let call = ToolCall {
            name: name.to_string(),
            parameters,
        };
        let output = orchestrator.dispatch(&mut session, &call).await;
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    println!("Goodbye.");
    Ok(())
}
