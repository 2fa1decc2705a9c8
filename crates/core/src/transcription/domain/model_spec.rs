use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::shared::constants::{DEFAULT_BEAM_SIZE, MAX_DEFAULT_THREADS, WHISPER_MODEL_BASE_URL};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} '{value}', expected one of: {expected}")]
pub struct ParseOptionError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

/// Whisper checkpoint size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModelSize {
    Tiny,
    Base,
    #[default]
    Small,
    Medium,
    LargeV3Turbo,
}

impl ModelSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelSize::Tiny => "tiny",
            ModelSize::Base => "base",
            ModelSize::Small => "small",
            ModelSize::Medium => "medium",
            ModelSize::LargeV3Turbo => "large-v3-turbo",
        }
    }
}

impl FromStr for ModelSize {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tiny" => Ok(ModelSize::Tiny),
            "base" => Ok(ModelSize::Base),
            "small" => Ok(ModelSize::Small),
            "medium" => Ok(ModelSize::Medium),
            "large-v3-turbo" | "turbo" => Ok(ModelSize::LargeV3Turbo),
            _ => Err(ParseOptionError {
                kind: "model size",
                value: s.to_string(),
                expected: "tiny, base, small, medium, large-v3-turbo",
            }),
        }
    }
}

impl fmt::Display for ModelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weight precision. whisper.cpp has no f32 checkpoints, so `Float32`
/// falls back to the f16 weights.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ComputeType {
    #[default]
    Int8,
    Float16,
    Float32,
}

impl ComputeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComputeType::Int8 => "int8",
            ComputeType::Float16 => "float16",
            ComputeType::Float32 => "float32",
        }
    }

    fn file_suffix(&self) -> &'static str {
        match self {
            ComputeType::Int8 => "-q8_0",
            ComputeType::Float16 | ComputeType::Float32 => "",
        }
    }
}

impl FromStr for ComputeType {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "int8" => Ok(ComputeType::Int8),
            "float16" | "f16" => Ok(ComputeType::Float16),
            "float32" | "f32" => Ok(ComputeType::Float32),
            _ => Err(ParseOptionError {
                kind: "compute type",
                value: s.to_string(),
                expected: "int8, float16, float32",
            }),
        }
    }
}

impl fmt::Display for ComputeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Device {
    #[default]
    Cpu,
    Gpu,
}

impl Device {
    pub fn use_gpu(&self) -> bool {
        matches!(self, Device::Gpu)
    }
}

impl FromStr for Device {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cpu" => Ok(Device::Cpu),
            "gpu" | "cuda" => Ok(Device::Gpu),
            _ => Err(ParseOptionError {
                kind: "device",
                value: s.to_string(),
                expected: "cpu, gpu",
            }),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => f.write_str("cpu"),
            Device::Gpu => f.write_str("gpu"),
        }
    }
}

/// Identifies one downloadable ggml checkpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModelSpec {
    pub size: ModelSize,
    pub compute_type: ComputeType,
}

impl ModelSpec {
    pub fn new(size: ModelSize, compute_type: ComputeType) -> Self {
        Self { size, compute_type }
    }

    /// e.g. `ggml-small-q8_0.bin`
    pub fn file_name(&self) -> String {
        format!(
            "ggml-{}{}.bin",
            self.size.as_str(),
            self.compute_type.file_suffix()
        )
    }

    pub fn download_url(&self) -> String {
        format!("{WHISPER_MODEL_BASE_URL}/{}", self.file_name())
    }
}

/// Decoding parameters handed to the recognizer.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodeOptions {
    /// Beam width; 1 decodes greedily.
    pub beam_size: usize,
    /// ISO 639-1 code, or None to let the model detect the language.
    pub language: Option<String>,
    pub threads: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            beam_size: DEFAULT_BEAM_SIZE,
            language: None,
            threads: default_threads(),
        }
    }
}

pub fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(MAX_DEFAULT_THREADS)
}
