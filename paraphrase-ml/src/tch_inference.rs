//! TorchScript inference engine via tch-rs
//!
//! Alternative to [`OnnxInferenceEngine`](crate::OnnxInferenceEngine) for
//! classifiers exported with `torch.jit.trace` instead of `torch.onnx`.

use anyhow::{bail, Context, Result};
use paraphrase_core::{DetectorError, EncodedPair, InferenceEngine, RawLogits};
use parking_lot::Mutex;
use std::path::Path;
use tch::{Device, Tensor};

use crate::metadata::ModelMetadata;
use crate::options::{EngineOptions, ExecutionBackend};
use crate::tch_loader::TchModel;

const WARMUP_SEQ_LEN: i64 = 16;

/// TorchScript engine for the paraphrase classifier
///
/// ## Example
/// ```no_run
/// # use paraphrase_ml::{EngineOptions, TchInferenceEngine};
/// # fn example() -> anyhow::Result<()> {
/// let engine = TchInferenceEngine::load("models/mrpc_model.pt", EngineOptions::default())?;
/// println!("Device: {:?}", engine.device());
/// # Ok(())
/// # }
/// ```
pub struct TchInferenceEngine {
    model: Mutex<TchModel>,
    metadata: ModelMetadata,
    device: Device,
}

impl TchInferenceEngine {
    pub fn load<P: AsRef<Path>>(model_path: P, options: EngineOptions) -> Result<Self> {
        if let Some(threads) = options.intra_threads {
            tch::set_num_threads(threads as i32);
        }

        let device = TchModel::select_device(options.backend);
        let model = TchModel::load(model_path, device)?;

        // MPS warmup needs a full PyTorch build, not the plain libtorch one
        if options.warmup && device != Device::Mps {
            model.warmup(WARMUP_SEQ_LEN).context("Model warmup failed")?;
        } else if options.warmup {
            tracing::warn!("Skipping warmup for MPS device");
        }

        Ok(Self {
            metadata: model.metadata.clone(),
            model: Mutex::new(model),
            device,
        })
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn backend(&self) -> ExecutionBackend {
        TchModel::execution_backend(self.device)
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// Execute the module once over `batch`
    pub fn run_batch(&self, batch: &[EncodedPair]) -> Result<Vec<RawLogits>> {
        if batch.is_empty() {
            return Ok(vec![]);
        }

        let seq_len = batch[0].len();
        if batch.iter().any(|pair| pair.len() != seq_len) {
            bail!("Ragged batch: all encoded pairs must share one sequence length");
        }

        let batch_size = batch.len() as i64;
        let input_ids: Vec<i64> = batch.iter().flat_map(|p| p.input_ids().iter().copied()).collect();
        let attention_mask: Vec<i64> = batch
            .iter()
            .flat_map(|p| p.attention_mask().iter().copied())
            .collect();

        let input_ids = Tensor::from_slice(&input_ids)
            .reshape([batch_size, seq_len as i64])
            .to_device(self.device);
        let attention_mask = Tensor::from_slice(&attention_mask)
            .reshape([batch_size, seq_len as i64])
            .to_device(self.device);

        let output = self.model.lock().forward(input_ids, attention_mask)?;

        let num_labels = self.metadata.num_labels;
        let size = output.size();
        if size != [batch_size, num_labels as i64] {
            bail!(
                "Unexpected output shape {:?}, expected [{}, {}]",
                size,
                batch_size,
                num_labels
            );
        }

        let flat: Vec<f32> = Vec::<f32>::try_from(output.to_kind(tch::Kind::Float).flatten(0, -1))
            .context("Failed to copy logits from device")?;

        Ok(flat.chunks(num_labels).map(|row| row.to_vec()).collect())
    }
}

impl InferenceEngine for TchInferenceEngine {
    fn run(&self, batch: &[EncodedPair]) -> paraphrase_core::error::Result<Vec<RawLogits>> {
        self.run_batch(batch)
            .map_err(|e| DetectorError::Inference(format!("{:#}", e)))
    }

    fn num_labels(&self) -> usize {
        self.metadata.num_labels
    }

    fn backend_name(&self) -> &str {
        "tch"
    }

    fn backend_info(&self) -> String {
        format!(
            "PyTorch via tch-rs ({}, model: {})",
            self.backend(),
            self.metadata.model_name_or_path
        )
    }

    fn vocab_fingerprint(&self) -> Option<&str> {
        self.metadata.vocab_fingerprint.as_deref()
    }

    fn max_sequence_length(&self) -> Option<usize> {
        Some(self.metadata.max_seq_length)
    }
}
