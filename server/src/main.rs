use anyhow::Result;
use axum::Router;
use clap::Parser;
use ircore::{IndexConfig, NormalizerKind, TokenizerKind};
use irserver::build_app;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Corpus file or directory to index at startup
    #[arg(long)]
    corpus: PathBuf,
    /// Document field to index; repeat for several
    #[arg(long = "field", default_value = "body")]
    fields: Vec<String>,
    /// Variable-byte compress the posting lists
    #[arg(long, default_value_t = false)]
    compressed: bool,
    #[arg(long, default_value_t = NormalizerKind::Simple)]
    normalizer: NormalizerKind,
    #[arg(long, default_value_t = TokenizerKind::Simple)]
    tokenizer: TokenizerKind,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let config = IndexConfig {
        fields: args.fields,
        compressed: args.compressed,
        normalizer: args.normalizer,
        tokenizer: args.tokenizer,
    };
    let app: Router = build_app(&args.corpus, &config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
