use anyhow::Result;
use clap::Parser;
use client_core::{CommandGateway, ExecutorClient};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
#[command(
    name = "console",
    about = "Headless console for the firewall command executor"
)]
struct Args {
    /// Base URL of the executor service. Falls back to FWCONSOLE_SERVER_URL,
    /// then http://127.0.0.1:5000.
    #[arg(long)]
    server_url: Option<String>,
}

/// Lines starting with `:` are console directives; everything else is
/// forwarded verbatim to the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Directive {
    RecentLogs,
    Rollback,
    ToggleSafeMode,
    Quit,
}

fn parse_directive(line: &str) -> Option<Directive> {
    match line.trim() {
        ":logs" => Some(Directive::RecentLogs),
        ":rollback" => Some(Directive::Rollback),
        ":safe-mode" => Some(Directive::ToggleSafeMode),
        ":quit" | ":q" => Some(Directive::Quit),
        _ => None,
    }
}

async fn submit(client: &ExecutorClient, line: &str) {
    match client.execute(line).await {
        Ok(outcome) => {
            match serde_json::to_string_pretty(&outcome.parsed_command) {
                Ok(pretty) => println!("parsed command:\n{pretty}"),
                Err(err) => tracing::error!(error = %err, "could not render parsed command"),
            }
            println!("execution result:\n{}", outcome.execution_result);
        }
        Err(err) => {
            tracing::error!(error = %err, "command submission failed");
            eprintln!("error: {err}");
            if err.is_transport() {
                eprintln!("hint: is the executor service running at the configured URL?");
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let server_url = args
        .server_url
        .or_else(|| std::env::var("FWCONSOLE_SERVER_URL").ok())
        .unwrap_or_else(|| "http://127.0.0.1:5000".to_string());
    let client = ExecutorClient::new(&server_url)?;
    println!(
        "Connected to {} (directives: :logs :rollback :safe-mode :quit)",
        client.base_url()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_directive(&line) {
            Some(Directive::Quit) => break,
            Some(Directive::RecentLogs) => match client.recent_logs().await {
                Ok(logs) => println!("{logs}"),
                Err(err) => eprintln!("error: {err}"),
            },
            Some(Directive::Rollback) => match client.rollback_failsafe().await {
                Ok(result) => println!("{result}"),
                Err(err) => eprintln!("error: {err}"),
            },
            Some(Directive::ToggleSafeMode) => match client.toggle_safe_mode().await {
                Ok(mode) => println!("safe mode is now {mode}"),
                Err(err) => eprintln!("error: {err}"),
            },
            None => submit(&client, &line).await,
        }
    }

    Ok(())
}
