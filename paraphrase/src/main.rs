//! Paraphrase detection HTTP server
//!
//! ```bash
//! # Defaults: models/mrpc_model.onnx, hub tokenizer, 0.0.0.0:8000
//! paraphrase-server
//!
//! # Custom model and local tokenizer
//! paraphrase-server --model models/mrpc_model.onnx --tokenizer models/tokenizer.json
//!
//! # JSON config file with an override
//! PARAPHRASE_BIND=127.0.0.1:9000 paraphrase-server --config service.json
//!
//! RUST_LOG=debug paraphrase-server
//! ```
//!
//! Priority: CLI arguments > environment variables > config file > defaults

use anyhow::{Context, Result};
use clap::Parser;
use paraphrase::{build_detector, http, BackendPreference, ConfigOverrides, ServiceConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "paraphrase-server", version, about = "Serve a sentence-pair paraphrase classifier over HTTP")]
struct Args {
    /// JSON configuration file
    #[arg(long, env = "PARAPHRASE_CONFIG")]
    config: Option<PathBuf>,

    /// Model artifact (.onnx)
    #[arg(long, env = "PARAPHRASE_MODEL")]
    model: Option<PathBuf>,

    /// tokenizer.json / vocab.txt path or HuggingFace model id
    #[arg(long, env = "PARAPHRASE_TOKENIZER")]
    tokenizer: Option<String>,

    /// Fixed sequence length
    #[arg(long, env = "PARAPHRASE_MAX_LENGTH")]
    max_length: Option<usize>,

    /// Execution backend: auto, cpu or cuda
    #[arg(long, env = "PARAPHRASE_BACKEND")]
    backend: Option<BackendPreference>,

    /// Intra-op thread count
    #[arg(long, env = "PARAPHRASE_INTRA_THREADS")]
    intra_threads: Option<usize>,

    /// Listen address
    #[arg(long, env = "PARAPHRASE_BIND")]
    bind: Option<String>,

    /// Reject sentences longer than this many characters
    #[arg(long, env = "PARAPHRASE_MAX_INPUT_CHARS")]
    max_input_chars: Option<usize>,

    /// Skip the tokenizer / model vocabulary fingerprint check
    #[arg(long, env = "PARAPHRASE_SKIP_VOCAB_CHECK")]
    skip_vocab_check: bool,

    /// Refuse to start when --max-length differs from the model's training length
    #[arg(long, env = "PARAPHRASE_STRICT_SEQ_LENGTH")]
    strict_seq_length: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            model_path: self.model.clone(),
            tokenizer: self.tokenizer.clone(),
            max_length: self.max_length,
            backend: self.backend,
            intra_threads: self.intra_threads,
            bind: self.bind.clone(),
            max_input_chars: self.max_input_chars,
            skip_vocabulary_check: self.skip_vocab_check,
            strict_sequence_length: self.strict_seq_length,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    info!("Paraphrase server v{} starting", paraphrase::VERSION);

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {:?}", path);
            ServiceConfig::from_file(path)?
        }
        None => ServiceConfig::default(),
    };
    config.apply_overrides(args.overrides());

    // Model loading blocks; keep it off the async workers
    let startup_config = config.clone();
    let detector = tokio::task::spawn_blocking(move || build_detector(&startup_config))
        .await
        .context("Startup task failed")?
        .context("Failed to initialise paraphrase detector")?;

    let addr = config.bind_addr()?;
    let app = http::router(Arc::new(detector));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
