//! Command-line smoke harness (SPEC_FULL.md §C.5).
//!
//! Drives one `AgentOrchestrator` against a scripted [`MockAdapter`] and a
//! no-op CDP connection, so the orchestrator's wiring can be exercised
//! without network access or a real browser attached.

use std::sync::Arc;

use clap::{Parser, Subcommand};

use browzer_types::TabId;
use cdp_adapter::{CdpAdapter, CdpConfig};
use llm_provider::{MockAdapter, ProviderRegistry};
use tool_registry::ToolRegistry;

use crate::agent::{AgentOrchestrator, ExecuteTaskOptions};
use crate::config::BrowzerConfig;

#[derive(Parser)]
#[command(name = "browzer", about = "Core agentic execution engine for a web-browsing assistant")]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a single task against a mock browser/LLM pair and print the result.
    Run {
        /// The task to hand to the agent, e.g. "open https://example.com".
        goal: String,
        #[arg(long, default_value = "cli-tab")]
        tab: String,
    },
    /// Print aggregated execution/provider/memory statistics.
    Stats,
}

fn mock_orchestrator() -> anyhow::Result<AgentOrchestrator> {
    let config = BrowzerConfig::for_mock(Default::default());
    let mut providers = ProviderRegistry::new();
    providers.register(Arc::new(MockAdapter::immediate_completion("Task completed.")));
    let tools = Arc::new(ToolRegistry::with_unimplemented_handler());
    let cdp = Arc::new(CdpAdapter::noop(CdpConfig::default()));
    Ok(AgentOrchestrator::new(config.agent, providers, tools, cdp)?)
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run { goal, tab } => {
            let orchestrator = mock_orchestrator()?;
            let result = orchestrator
                .execute_task(goal, TabId::from(tab), ExecuteTaskOptions::default())
                .await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Stats => {
            let orchestrator = mock_orchestrator()?;
            let stats = orchestrator.get_global_stats();
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }
    Ok(())
}
