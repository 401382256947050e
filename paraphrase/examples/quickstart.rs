//! Paraphrase Detection Quick Start
//!
//! Loads the exported classifier and scores a handful of sentence pairs.
//!
//! ## Prerequisites
//!
//! 1. `models/mrpc_model.onnx` in the workspace root
//! 2. Network access for the hub tokenizer, or `PARAPHRASE_TOKENIZER`
//!    pointing at a local `tokenizer.json`
//!
//! ## Running
//!
//! ```bash
//! cargo run -p paraphrase --example quickstart
//! ```

use paraphrase::{build_detector, ServiceConfig};
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let mut config = ServiceConfig::default();
    if let Ok(tokenizer) = std::env::var("PARAPHRASE_TOKENIZER") {
        config.tokenizer = tokenizer;
    }

    println!("Loading detector...");
    let start = Instant::now();
    let detector = build_detector(&config)?;
    println!("Ready in {:?}\n", start.elapsed());

    let pairs = [
        ("The firm announced increased earnings.", "The company reported higher profits."),
        ("The dog is sleeping.", "The cat is playing."),
        ("Hello world!", "Hello world!"),
        ("He started the car.", "He stopped the car."),
    ];

    for (sentence1, sentence2) in pairs {
        let start = Instant::now();
        let prediction = detector.predict(sentence1, sentence2)?;
        println!("S1: {}", sentence1);
        println!("S2: {}", sentence2);
        println!(
            "   {} (confidence: {:.4}, {:?})\n",
            prediction.predicted_label,
            prediction.confidence,
            start.elapsed()
        );
    }

    Ok(())
}
