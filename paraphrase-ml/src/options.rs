//! Engine construction options

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Requested execution backend
///
/// `Auto` uses an accelerator when one is available at startup and falls
/// back to CPU otherwise. An explicit `Cuda` request that cannot be honoured
/// also falls back to CPU with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendPreference {
    #[default]
    Auto,
    Cpu,
    Cuda,
}

impl FromStr for BackendPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "cpu" => Ok(Self::Cpu),
            "cuda" | "gpu" => Ok(Self::Cuda),
            other => Err(format!(
                "unknown backend '{}', expected one of: auto, cpu, cuda",
                other
            )),
        }
    }
}

impl fmt::Display for BackendPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Cpu => f.write_str("cpu"),
            Self::Cuda => f.write_str("cuda"),
        }
    }
}

/// Backend actually selected at load time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionBackend {
    Cpu,
    Cuda(i32),
    Mps,
}

impl fmt::Display for ExecutionBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => f.write_str("CPU"),
            Self::Cuda(id) => write!(f, "CUDA:{}", id),
            Self::Mps => f.write_str("MPS (Apple Silicon)"),
        }
    }
}

/// Options applied when loading an inference engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub backend: BackendPreference,
    /// Threads used within a single operator; `None` lets the runtime decide
    pub intra_threads: Option<usize>,
    /// Run a dummy forward pass after loading to validate the output shape
    pub warmup: bool,
}

impl EngineOptions {
    pub fn new() -> Self {
        Self {
            backend: BackendPreference::Auto,
            intra_threads: None,
            warmup: true,
        }
    }

    pub fn with_backend(mut self, backend: BackendPreference) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_intra_threads(mut self, threads: usize) -> Self {
        self.intra_threads = Some(threads);
        self
    }

    pub fn with_warmup(mut self, warmup: bool) -> Self {
        self.warmup = warmup;
        self
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::new()
    }
}
