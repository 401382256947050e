//! TorchScript model loading for the tch-rs backend
//!
//! Loads a classifier traced with `torch.jit.trace` over
//! `(input_ids, attention_mask)`. The artifact shares the metadata sidecar
//! format with the ONNX export.

use anyhow::{bail, Context, Result};
use std::path::Path;
use tch::{CModule, Device, Kind, Tensor};

use crate::metadata::ModelMetadata;
use crate::options::{BackendPreference, ExecutionBackend};

/// Loaded TorchScript module with its metadata
pub struct TchModel {
    pub module: CModule,
    pub metadata: ModelMetadata,
    pub device: Device,
}

impl TchModel {
    /// Load a TorchScript module onto `device`
    ///
    /// # Example
    /// ```no_run
    /// # use paraphrase_ml::TchModel;
    /// # use tch::Device;
    /// # fn example() -> anyhow::Result<()> {
    /// let model = TchModel::load("models/mrpc_model.pt", Device::Cpu)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn load<P: AsRef<Path>>(model_path: P, device: Device) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            bail!("Model file not found: {:?}", model_path);
        }

        let metadata = ModelMetadata::load_for(model_path)?;
        metadata.validate()?;

        tracing::info!(
            "Loading TorchScript model from {:?} on device {:?}",
            model_path,
            device
        );

        let mut module = CModule::load_on_device(model_path, device)
            .with_context(|| format!("Failed to load TorchScript model: {:?}", model_path))?;

        // Disables dropout
        module.set_eval();

        tracing::info!(
            "Successfully loaded model: {} (labels: {})",
            metadata.model_name_or_path,
            metadata.num_labels
        );

        Ok(TchModel {
            module,
            metadata,
            device,
        })
    }

    /// Resolve a backend preference to a tch device
    ///
    /// Priority for `Auto`: CUDA > MPS > CPU
    pub fn select_device(preference: BackendPreference) -> Device {
        match preference {
            BackendPreference::Cpu => {
                tracing::info!("Using CPU device");
                Device::Cpu
            }
            BackendPreference::Cuda | BackendPreference::Auto if tch::Cuda::is_available() => {
                tracing::info!("CUDA available, using GPU device 0");
                Device::Cuda(0)
            }
            BackendPreference::Auto if tch::utils::has_mps() => {
                tracing::info!("MPS available, using Apple Silicon GPU");
                Device::Mps
            }
            BackendPreference::Cuda => {
                tracing::warn!("CUDA requested but not available, falling back to CPU");
                Device::Cpu
            }
            BackendPreference::Auto => {
                tracing::info!("Using CPU device");
                Device::Cpu
            }
        }
    }

    /// Map a tch device to the backend reported by the engine
    pub fn execution_backend(device: Device) -> ExecutionBackend {
        match device {
            Device::Cuda(id) => ExecutionBackend::Cuda(id as i32),
            Device::Mps => ExecutionBackend::Mps,
            _ => ExecutionBackend::Cpu,
        }
    }

    /// Forward `input_ids` and `attention_mask`, both `[batch, seq]` i64
    pub fn forward(&self, input_ids: Tensor, attention_mask: Tensor) -> Result<Tensor> {
        tch::no_grad(|| {
            self.module
                .forward_ts(&[input_ids, attention_mask])
                .context("Forward pass failed")
        })
    }

    /// Run a dummy forward pass and check the output width
    pub fn warmup(&self, seq_length: i64) -> Result<()> {
        tracing::debug!("Warming up model with seq_length={}", seq_length);

        let input_ids = Tensor::zeros([1, seq_length], (Kind::Int64, self.device));
        let attention_mask = Tensor::ones([1, seq_length], (Kind::Int64, self.device));

        let output = self.forward(input_ids, attention_mask)?;
        let size = output.size();
        if size != [1, self.metadata.num_labels as i64] {
            bail!(
                "Unexpected output shape {:?}, expected [1, {}]",
                size,
                self.metadata.num_labels
            );
        }

        tracing::debug!("Model warmup complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_preference() {
        assert_eq!(TchModel::select_device(BackendPreference::Cpu), Device::Cpu);
    }

    #[test]
    fn test_execution_backend_mapping() {
        assert_eq!(
            TchModel::execution_backend(Device::Cuda(1)),
            ExecutionBackend::Cuda(1)
        );
        assert_eq!(TchModel::execution_backend(Device::Mps), ExecutionBackend::Mps);
        assert_eq!(TchModel::execution_backend(Device::Cpu), ExecutionBackend::Cpu);
    }

    #[test]
    fn test_missing_model() {
        let err = TchModel::load("does/not/exist.pt", Device::Cpu).err().unwrap();
        assert!(err.to_string().contains("Model file not found"));
    }
}
