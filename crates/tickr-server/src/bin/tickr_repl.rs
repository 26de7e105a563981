//! TICKR terminal chat
//!
//! One session over stdin/stdout. `exit` or `quit` (any case) leaves.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stock_advisor::{AdvisorConfig, StockAdvisor};
use tickr_core::{DialogueRouter, Session};

fn is_exit(line: &str) -> bool {
    let line = line.trim();
    line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit")
}

fn prompt() -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "You: ")?;
    stdout.flush()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AdvisorConfig::from_env()?;
    let router = DialogueRouter::new(Arc::new(StockAdvisor::from_config(&config)?));
    let mut session = Session::new();

    println!("Welcome to TICKR! Type 'exit' to leave.");
    prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if is_exit(&line) {
            break;
        }

        let reply = router.handle_turn(&line, &mut session.context).await;
        session.touch();
        println!("TICKR: {reply}");
        prompt()?;
    }

    session.end();
    tracing::debug!(turns = session.turns, "Session finished");
    println!("Goodbye! Have a nice day! 😊");
    Ok(())
}
