//! Inference configuration settings

use std::path::PathBuf;

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

/// Device configuration for inference
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeviceConfig {
    /// Simple device string (e.g., "auto", "cuda:0", "cpu")
    Simple(String),
    /// Detailed device configuration
    Detailed {
        /// Device type: "auto", "cuda", "cpu"
        device_type: String,
        /// Device ID (for multi-GPU)
        #[serde(default)]
        device_id: usize,
    },
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig::Simple("auto".to_string())
    }
}

impl DeviceConfig {
    /// Get device type ("auto", "cuda" or "cpu")
    pub fn device_type(&self) -> &str {
        match self {
            DeviceConfig::Simple(s) => {
                if s.starts_with("cuda") || s == "gpu" {
                    "cuda"
                } else if s == "cpu" {
                    "cpu"
                } else {
                    "auto"
                }
            }
            DeviceConfig::Detailed { device_type, .. } => device_type,
        }
    }

    /// Get device ID (for multi-GPU)
    pub fn device_id(&self) -> usize {
        match self {
            DeviceConfig::Simple(s) => s
                .strip_prefix("cuda:")
                .and_then(|id| id.parse().ok())
                .unwrap_or(0),
            DeviceConfig::Detailed { device_id, .. } => *device_id,
        }
    }

    /// Whether an accelerator should be tried before the CPU
    pub fn wants_accelerator(&self) -> bool {
        matches!(self.device_type(), "cuda" | "auto")
    }
}

/// Pixel normalization applied after resizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Raw 0..=255 values; the graph rescales internally (EfficientNet exports)
    #[default]
    Passthrough,
    /// x / 255
    Unit,
    /// x / 127.5 - 1
    Symmetric,
    /// (x / 255 - mean) / std with ImageNet statistics
    Imagenet,
}

/// Input tensor layout, batch of one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TensorLayout {
    #[default]
    Nhwc,
    Nchw,
}

/// Post-processing applied to the raw model output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputActivation {
    /// Model already emits probabilities
    #[default]
    None,
    Softmax,
}

/// Resampling filter used for resizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    #[default]
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Inference-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Resize target as [height, width]
    #[serde(default = "default_image_size")]
    pub image_size: [u32; 2],

    /// Resampling filter for the resize
    #[serde(default)]
    pub resize_filter: ResizeFilter,

    /// Input normalization expected by the model
    #[serde(default)]
    pub normalization: Normalization,

    /// Input tensor layout
    #[serde(default)]
    pub layout: TensorLayout,

    /// Activation applied to the model output before ranking
    #[serde(default)]
    pub output_activation: OutputActivation,

    /// Device configuration
    #[serde(default)]
    pub device: DeviceConfig,

    /// Grow accelerator memory on demand instead of reserving large chunks
    #[serde(default = "default_true")]
    pub memory_growth: bool,

    /// ONNX Runtime intra-op thread count (None = runtime default)
    #[serde(default)]
    pub intra_threads: Option<usize>,

    /// Image classified once after every model load; failure aborts the load
    #[serde(default)]
    pub warmup_image: Option<PathBuf>,
}

fn default_image_size() -> [u32; 2] {
    [224, 224]
}

fn default_true() -> bool {
    true
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            image_size: default_image_size(),
            resize_filter: ResizeFilter::default(),
            normalization: Normalization::default(),
            layout: TensorLayout::default(),
            output_activation: OutputActivation::default(),
            device: DeviceConfig::default(),
            memory_growth: true,
            intra_threads: None,
            warmup_image: None,
        }
    }
}

impl InferenceConfig {
    pub fn height(&self) -> u32 {
        self.image_size[0]
    }

    pub fn width(&self) -> u32 {
        self.image_size[1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_config_parsing() {
        let auto = DeviceConfig::default();
        assert_eq!(auto.device_type(), "auto");
        assert!(auto.wants_accelerator());

        let cuda = DeviceConfig::Simple("cuda:1".to_string());
        assert_eq!(cuda.device_type(), "cuda");
        assert_eq!(cuda.device_id(), 1);

        let cpu = DeviceConfig::Simple("cpu".to_string());
        assert!(!cpu.wants_accelerator());

        let detailed: DeviceConfig =
            serde_yaml::from_str("device_type: cuda\ndevice_id: 2").unwrap();
        assert_eq!(detailed.device_type(), "cuda");
        assert_eq!(detailed.device_id(), 2);
    }

    #[test]
    fn test_enum_names() {
        let cfg: InferenceConfig = serde_yaml::from_str(
            "normalization: imagenet\nlayout: nchw\noutput_activation: softmax\nresize_filter: catmull_rom",
        )
        .unwrap();
        assert_eq!(cfg.normalization, Normalization::Imagenet);
        assert_eq!(cfg.layout, TensorLayout::Nchw);
        assert_eq!(cfg.output_activation, OutputActivation::Softmax);
        assert_eq!(cfg.resize_filter, ResizeFilter::CatmullRom);
        assert_eq!((cfg.height(), cfg.width()), (224, 224));
        assert!(cfg.memory_growth);
    }
}
