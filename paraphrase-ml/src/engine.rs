//! Engine factory
//!
//! Picks the runtime backend from the artifact's file extension so callers
//! can hold a single `Arc<dyn InferenceEngine>` regardless of export format.

use paraphrase_core::{DetectorError, InferenceEngine};
use std::path::Path;
use std::sync::Arc;

use crate::onnx_engine::OnnxInferenceEngine;
use crate::options::EngineOptions;

/// Load an inference engine for the artifact at `model_path`
///
/// - `.onnx` loads through ONNX Runtime
/// - `.pt` / `.ts` load through tch-rs when built with `tch-backend`
///
/// # Example
/// ```no_run
/// use paraphrase_ml::{load_engine, EngineOptions};
/// # fn example() -> Result<(), paraphrase_core::DetectorError> {
/// let engine = load_engine("models/mrpc_model.onnx", EngineOptions::default())?;
/// println!("{}", engine.backend_info());
/// # Ok(())
/// # }
/// ```
pub fn load_engine<P: AsRef<Path>>(
    model_path: P,
    options: EngineOptions,
) -> Result<Arc<dyn InferenceEngine>, DetectorError> {
    let model_path = model_path.as_ref();

    if !model_path.exists() {
        return Err(DetectorError::ModelLoad(format!(
            "Model file not found: {:?}",
            model_path
        )));
    }

    let extension = model_path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "onnx" => {
            let engine = OnnxInferenceEngine::with_options(model_path, options)
                .map_err(|e| DetectorError::ModelLoad(format!("{:#}", e)))?;
            Ok(Arc::new(engine))
        }
        #[cfg(feature = "tch-backend")]
        "pt" | "ts" => {
            let engine = crate::TchInferenceEngine::load(model_path, options)
                .map_err(|e| DetectorError::ModelLoad(format!("{:#}", e)))?;
            Ok(Arc::new(engine))
        }
        #[cfg(not(feature = "tch-backend"))]
        "pt" | "ts" => Err(DetectorError::ModelLoad(format!(
            "TorchScript artifact {:?} requires the `tch-backend` feature",
            model_path
        ))),
        other => Err(DetectorError::ModelLoad(format!(
            "Unsupported model format '{}' for {:?}",
            other, model_path
        ))),
    }
}
