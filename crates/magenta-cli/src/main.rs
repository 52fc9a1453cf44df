//! Interactive terminal client for Magenta.
//!
//! A thin view layer over `SessionController`: reads user turns from a
//! rustyline prompt, paces newly arrived assistant messages through the
//! reveal scheduler, and prints the live document sections after each
//! turn that updated them.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use magenta_application::{GatewayFailurePolicy, SessionController};
use magenta_core::reveal::RevealScheduler;
use magenta_core::session::MessageRole;
use magenta_interaction::{
    BackendChatGateway, BackendConfig, ConfluencePublisher, DemoFallbackProvider,
};

#[derive(Parser)]
#[command(name = "magenta")]
#[command(about = "Magenta - AI business analyst in your terminal", long_about = None)]
struct Cli {
    /// Backend base URL (defaults to MAGENTA_BACKEND_URL or localhost:8000)
    #[arg(long)]
    backend_url: Option<String>,

    /// Surface a warning instead of switching to demo mode when the
    /// backend is unreachable
    #[arg(long)]
    warn_on_failure: bool,

    /// Milliseconds per revealed character (0 disables the animation)
    #[arg(long, default_value_t = 15)]
    reveal_interval_ms: u64,
}

const STARTER_PROMPTS: &[&str] = &[
    "Describe the loan issuance process",
    "We need an anti-fraud system",
    "Create a user story for login",
    "Draw the 1C integration scheme",
];

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.backend_url {
        Some(url) => BackendConfig::new(url.clone()),
        None => BackendConfig::from_env(),
    };
    let policy = if cli.warn_on_failure {
        GatewayFailurePolicy::SurfaceWarning
    } else {
        GatewayFailurePolicy::FallbackDemo
    };

    let controller = SessionController::new(
        Arc::new(BackendChatGateway::new(config.clone())),
        Arc::new(DemoFallbackProvider::new()),
        Arc::new(ConfluencePublisher::new(config)),
    )
    .with_policy(policy);

    let scheduler = RevealScheduler::new(Duration::from_millis(cli.reveal_interval_ms));
    let animate = cli.reveal_interval_ms > 0;

    println!("Magenta — AI business analyst. /new starts over, /doc shows the document, /quit exits.");
    println!("Try for example:");
    for prompt in STARTER_PROMPTS {
        println!("  - {}", prompt);
    }

    let mut editor = rustyline::DefaultEditor::new()?;
    loop {
        let line = match editor.readline("you> ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted)
            | Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(&line);

        match line.as_str() {
            "/quit" => break,
            "/new" => {
                let id = controller.reset().await;
                println!("New analysis started (session {}).", id);
                continue;
            }
            "/doc" => {
                print_document(&controller).await;
                continue;
            }
            _ => {}
        }

        match controller.send(&line).await {
            Ok(appended) => {
                let replies: Vec<_> = appended
                    .iter()
                    .filter(|m| m.role == MessageRole::Assistant)
                    .collect();
                for (index, reply) in replies.iter().enumerate() {
                    let is_latest = index + 1 == replies.len();
                    print_reply(&scheduler, &reply.content, animate && is_latest).await;
                }
            }
            Err(e) => eprintln!("error: {}", e),
        }
    }

    Ok(())
}

/// Prints one assistant reply, paced by the reveal scheduler when it is
/// the latest message.
async fn print_reply(scheduler: &RevealScheduler, content: &str, animate: bool) {
    print!("magenta> ");
    let mut printed = 0usize;
    let mut handle = scheduler.reveal(content, animate);
    while let Some(frame) = handle.next_frame().await {
        let tail: String = frame.text.chars().skip(printed).collect();
        printed = frame.text.chars().count();
        print!("{}", tail);
        let _ = std::io::stdout().flush();
    }
    println!();
}

async fn print_document(controller: &SessionController) {
    let artifacts = controller.artifacts().await;
    println!("# {} [{}]", artifacts.doc_title, artifacts.doc_version);
    if artifacts.sections.is_empty() {
        println!("(no sections yet — describe your project first)");
        return;
    }
    for section in &artifacts.sections {
        println!("\n## {}\n{}", section.title, section.content);
    }
    if !artifacts.diagram_code.is_empty() {
        println!("\n```mermaid\n{}\n```", artifacts.diagram_code);
    }
}
