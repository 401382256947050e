//! ONNX Runtime inference engine
//!
//! Executes the exported classifier graph via `ort`. The graph is bound once
//! at load time to a fixed signature:
//! - inputs `input_ids`, `attention_mask`: i64 `[batch, sequence_length]`
//! - output `output`: f32 `[batch, num_labels]`

use anyhow::{anyhow, bail, Context, Result};
use ort::execution_providers::{CUDAExecutionProvider, ExecutionProvider};
use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::session::Session;
use ort::value::Tensor;
use paraphrase_core::{DetectorError, EncodedPair, InferenceEngine, RawLogits};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::metadata::ModelMetadata;
use crate::options::{BackendPreference, EngineOptions, ExecutionBackend};

pub const INPUT_IDS: &str = "input_ids";
pub const ATTENTION_MASK: &str = "attention_mask";
pub const OUTPUT: &str = "output";

/// Sequence length used for the load-time warmup pass
const WARMUP_SEQ_LEN: usize = 16;

/// ONNX Runtime engine for the exported paraphrase classifier
///
/// ## Example
/// ```no_run
/// # use paraphrase_ml::OnnxInferenceEngine;
/// # fn example() -> anyhow::Result<()> {
/// let engine = OnnxInferenceEngine::load("models/mrpc_model.onnx")?;
/// println!("{}", engine.model_info());
/// # Ok(())
/// # }
/// ```
pub struct OnnxInferenceEngine {
    /// `Session::run` needs exclusive access to the session handle
    session: Mutex<Session>,
    metadata: ModelMetadata,
    backend: ExecutionBackend,
    model_path: PathBuf,
}

impl OnnxInferenceEngine {
    /// Load a model with default options (auto backend, warmup enabled)
    pub fn load<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        Self::with_options(model_path, EngineOptions::default())
    }

    /// Load a model with explicit options
    ///
    /// Fails if the file is missing, cannot be parsed by ONNX Runtime, lacks
    /// the required inputs/outputs, or produces the wrong output width.
    pub fn with_options<P: AsRef<Path>>(model_path: P, options: EngineOptions) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            bail!("Model file not found: {:?}", model_path);
        }

        let metadata = ModelMetadata::load_for(model_path)?;
        metadata.validate()?;

        let requested = Self::select_backend(options.backend);
        info!("Loading ONNX model from {:?} on {}", model_path, requested);

        let (session, backend) = Self::build_session(model_path, &options, requested)?;

        Self::check_signature(&session)?;

        let engine = Self {
            session: Mutex::new(session),
            metadata,
            backend,
            model_path: model_path.to_path_buf(),
        };

        if options.warmup {
            engine.warmup().context("Model warmup failed")?;
        }

        info!(
            "Successfully loaded model: {} (labels: {}, backend: {})",
            engine.metadata.model_name_or_path, engine.metadata.num_labels, engine.backend
        );

        Ok(engine)
    }

    /// Resolve the requested backend against what is available
    pub fn select_backend(preference: BackendPreference) -> ExecutionBackend {
        match preference {
            BackendPreference::Cpu => {
                info!("Using CPU execution provider");
                ExecutionBackend::Cpu
            }
            BackendPreference::Cuda | BackendPreference::Auto if cuda_available() => {
                info!("CUDA available, using GPU device 0");
                ExecutionBackend::Cuda(0)
            }
            BackendPreference::Cuda => {
                warn!("CUDA execution provider requested but not available, falling back to CPU");
                ExecutionBackend::Cpu
            }
            BackendPreference::Auto => {
                info!("Using CPU execution provider");
                ExecutionBackend::Cpu
            }
        }
    }

    /// Commit a session for `requested`, returning the backend it really runs on
    ///
    /// A CUDA provider that fails to register is dropped and the session is
    /// rebuilt on CPU.
    fn build_session(
        model_path: &Path,
        options: &EngineOptions,
        requested: ExecutionBackend,
    ) -> Result<(Session, ExecutionBackend)> {
        if let ExecutionBackend::Cuda(device_id) = requested {
            let registered = Self::session_builder(options)?.with_execution_providers([
                CUDAExecutionProvider::default()
                    .with_device_id(device_id)
                    .build()
                    .error_on_failure(),
            ]);
            match registered {
                Ok(builder) => {
                    let session = builder
                        .commit_from_file(model_path)
                        .map_err(|e| anyhow!("Failed to load ONNX model {:?}: {}", model_path, e))?;
                    return Ok((session, requested));
                }
                Err(e) => warn!(
                    "CUDA execution provider registration failed, falling back to CPU: {}",
                    e
                ),
            }
        }

        let session = Self::session_builder(options)?
            .commit_from_file(model_path)
            .map_err(|e| anyhow!("Failed to load ONNX model {:?}: {}", model_path, e))?;
        Ok((session, ExecutionBackend::Cpu))
    }

    fn session_builder(options: &EngineOptions) -> Result<SessionBuilder> {
        let mut builder = Session::builder()
            .map_err(|e| anyhow!("Failed to create session builder: {}", e))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| anyhow!("Failed to set optimization level: {}", e))?;

        if let Some(threads) = options.intra_threads {
            builder = builder
                .with_intra_threads(threads)
                .map_err(|e| anyhow!("Failed to set intra-op threads: {}", e))?;
        }

        Ok(builder)
    }

    fn check_signature(session: &Session) -> Result<()> {
        for name in [INPUT_IDS, ATTENTION_MASK] {
            if !session.inputs.iter().any(|input| input.name == name) {
                bail!("Model is missing required input '{}'", name);
            }
        }
        if !session.outputs.iter().any(|output| output.name == OUTPUT) {
            bail!("Model is missing required output '{}'", OUTPUT);
        }
        Ok(())
    }

    /// Run a dummy forward pass, checking the output shape
    pub fn warmup(&self) -> Result<()> {
        debug!("Warming up model with seq_length={}", WARMUP_SEQ_LEN);
        let dummy = EncodedPair::new(vec![0; WARMUP_SEQ_LEN], vec![1; WARMUP_SEQ_LEN])
            .ok_or_else(|| anyhow!("Invalid warmup input"))?;
        self.run_batch(std::slice::from_ref(&dummy))?;
        debug!("Model warmup complete");
        Ok(())
    }

    /// Execute the graph once over `batch`
    pub fn run_batch(&self, batch: &[EncodedPair]) -> Result<Vec<RawLogits>> {
        if batch.is_empty() {
            return Ok(vec![]);
        }

        let batch_size = batch.len();
        let seq_len = batch[0].len();
        if seq_len == 0 {
            bail!("Encoded pairs must not be empty");
        }
        if let Some(ragged) = batch.iter().find(|pair| pair.len() != seq_len) {
            bail!(
                "Ragged batch: expected sequence length {}, got {}",
                seq_len,
                ragged.len()
            );
        }

        let mut input_ids = Vec::with_capacity(batch_size * seq_len);
        let mut attention_mask = Vec::with_capacity(batch_size * seq_len);
        for pair in batch {
            input_ids.extend_from_slice(pair.input_ids());
            attention_mask.extend_from_slice(pair.attention_mask());
        }

        let input_ids = Tensor::from_array(([batch_size, seq_len], input_ids))
            .map_err(|e| anyhow!("Failed to build {} tensor: {}", INPUT_IDS, e))?;
        let attention_mask = Tensor::from_array(([batch_size, seq_len], attention_mask))
            .map_err(|e| anyhow!("Failed to build {} tensor: {}", ATTENTION_MASK, e))?;

        let num_labels = self.metadata.num_labels;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![
                INPUT_IDS => input_ids,
                ATTENTION_MASK => attention_mask,
            ])
            .map_err(|e| anyhow!("Forward pass failed: {}", e))?;

        let (shape, data) = outputs[OUTPUT]
            .try_extract_tensor::<f32>()
            .map_err(|e| anyhow!("Failed to read '{}' tensor: {}", OUTPUT, e))?;

        let dims: Vec<i64> = shape.iter().copied().collect();
        if dims != [batch_size as i64, num_labels as i64] {
            bail!(
                "Unexpected output shape {:?}, expected [{}, {}]",
                dims,
                batch_size,
                num_labels
            );
        }

        Ok(data.chunks(num_labels).map(|row| row.to_vec()).collect())
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn backend(&self) -> ExecutionBackend {
        self.backend
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Get model information as a formatted string
    pub fn model_info(&self) -> String {
        let meta = &self.metadata;
        format!(
            "Model: {}\nPath: {:?}\nTokenizer: {}\nLabels: {}\nMax length: {}\nOpset: {}\nBackend: {}",
            meta.model_name_or_path,
            self.model_path,
            meta.tokenizer_name,
            meta.labels.join(", "),
            meta.max_seq_length,
            meta.opset_version
                .map(|v| v.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            self.backend
        )
    }
}

impl InferenceEngine for OnnxInferenceEngine {
    fn run(&self, batch: &[EncodedPair]) -> paraphrase_core::error::Result<Vec<RawLogits>> {
        self.run_batch(batch)
            .map_err(|e| DetectorError::Inference(format!("{:#}", e)))
    }

    fn num_labels(&self) -> usize {
        self.metadata.num_labels
    }

    fn backend_name(&self) -> &str {
        "onnx"
    }

    fn backend_info(&self) -> String {
        format!(
            "ONNX Runtime ({}, model: {})",
            self.backend, self.metadata.model_name_or_path
        )
    }

    fn vocab_fingerprint(&self) -> Option<&str> {
        self.metadata.vocab_fingerprint.as_deref()
    }

    fn max_sequence_length(&self) -> Option<usize> {
        Some(self.metadata.max_seq_length)
    }
}

/// Whether the CUDA execution provider can be used in this process
pub fn cuda_available() -> bool {
    match CUDAExecutionProvider::default().is_available() {
        Ok(available) => available,
        Err(e) => {
            debug!("CUDA availability check failed: {}", e);
            false
        }
    }
}
