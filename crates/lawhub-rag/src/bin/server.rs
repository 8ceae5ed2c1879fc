//! LawHub server binary
//!
//! Run with: cargo run -p lawhub-rag --bin lawhub-server -- --config lawhub.toml

use clap::Parser;
use lawhub_rag::{config::RagConfig, server::RagServer};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Constitution-grounded legal Q&A server
#[derive(Parser, Debug)]
#[command(name = "lawhub-server", version, about)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, default_value = "lawhub.toml")]
    config: PathBuf,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,

    /// Build the index lazily on the first question instead of at startup
    #[arg(long)]
    no_preload: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lawhub_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                       LawHub Legal Q&A                    ║
║        Constitution-grounded answers with citations       ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    // Load configuration
    let mut config = RagConfig::load(Some(&args.config))?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.no_preload {
        config.server.preload = false;
    }

    tracing::info!("Configuration loaded");
    tracing::info!("  - Document: {}", config.document.path.display());
    tracing::info!("  - Embedding model: {}", config.embeddings.model);
    tracing::info!("  - LLM model: {}", config.llm.generate_model);
    tracing::info!(
        "  - Chunking: {} chars, {} overlap",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );
    match config.remote_index() {
        Some(pinecone) => tracing::info!("  - Vector store: Pinecone ({})", pinecone.index_name),
        None => tracing::info!(
            "  - Vector store: local ({})",
            config.vector_db.persist_dir.display()
        ),
    }

    let server = RagServer::new(config);

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/ask         - Ask a legal question");
    println!("  POST /api/legal_qa    - Ask with country detection");
    println!("  POST /api/chat_rag    - Answer from the document only");
    println!("  GET  /api/test_rag    - Retrieval self-check");
    println!("  POST /api/preload_rag - Build the index now");
    println!("  GET  /api/status      - Pipeline status");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
