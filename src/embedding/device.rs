use std::fmt;
use std::str::FromStr;

use candle_core::Device;
use tracing::{debug, info, warn};

use super::error::EmbeddingError;

/// Compute backend requested through configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceKind {
    #[default]
    Cpu,
    Cuda,
    Metal,
}

impl DeviceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::Cpu => "cpu",
            DeviceKind::Cuda => "cuda",
            DeviceKind::Metal => "metal",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceKind {
    type Err = EmbeddingError;

    /// Accepts `none`/`cpu`, `cuda` and `rocm` (exposed through the CUDA backend), `metal`/`mps`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" | "cpu" => Ok(DeviceKind::Cpu),
            "cuda" | "rocm" => Ok(DeviceKind::Cuda),
            "metal" | "mps" => Ok(DeviceKind::Metal),
            other => Err(EmbeddingError::InvalidConfig {
                reason: format!("unknown device '{other}' (expected cpu, cuda or metal)"),
            }),
        }
    }
}

/// Resolves the requested backend, falling back to CPU when it cannot be opened.
///
/// Never fails: an unavailable GPU (missing feature or driver) is logged and replaced by
/// [`Device::Cpu`].
pub fn select_device(requested: DeviceKind) -> Device {
    let attempt = match requested {
        DeviceKind::Cpu => {
            debug!("CPU device requested");
            return Device::Cpu;
        }
        DeviceKind::Cuda => open_cuda(),
        DeviceKind::Metal => open_metal(),
    };

    match attempt {
        Ok(device) => {
            info!(device = %requested, "Using GPU acceleration");
            device
        }
        Err(reason) => {
            warn!(device = %requested, reason = %reason, "Requested device unavailable, using CPU");
            Device::Cpu
        }
    }
}

#[cfg(feature = "cuda")]
fn open_cuda() -> Result<Device, String> {
    Device::new_cuda(0).map_err(|e| e.to_string())
}

#[cfg(not(feature = "cuda"))]
fn open_cuda() -> Result<Device, String> {
    Err("binary built without the `cuda` feature".to_string())
}

#[cfg(feature = "metal")]
fn open_metal() -> Result<Device, String> {
    Device::new_metal(0).map_err(|e| e.to_string())
}

#[cfg(not(feature = "metal"))]
fn open_metal() -> Result<Device, String> {
    Err("binary built without the `metal` feature".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_device_kind() {
        assert_eq!("cpu".parse::<DeviceKind>().unwrap(), DeviceKind::Cpu);
        assert_eq!("NONE".parse::<DeviceKind>().unwrap(), DeviceKind::Cpu);
        assert_eq!("".parse::<DeviceKind>().unwrap(), DeviceKind::Cpu);
        assert_eq!("CUDA".parse::<DeviceKind>().unwrap(), DeviceKind::Cuda);
        assert_eq!("rocm".parse::<DeviceKind>().unwrap(), DeviceKind::Cuda);
        assert_eq!("mps".parse::<DeviceKind>().unwrap(), DeviceKind::Metal);
        assert_eq!(" metal ".parse::<DeviceKind>().unwrap(), DeviceKind::Metal);
    }

    #[test]
    fn test_parse_unknown_device_fails() {
        let err = "tpu".parse::<DeviceKind>().unwrap_err();
        assert!(matches!(err, EmbeddingError::InvalidConfig { .. }));
        assert!(err.to_string().contains("tpu"));
    }

    #[test]
    fn test_select_cpu() {
        assert!(select_device(DeviceKind::Cpu).is_cpu());
    }

    #[cfg(not(feature = "cuda"))]
    #[test]
    fn test_cuda_falls_back_without_feature() {
        assert!(select_device(DeviceKind::Cuda).is_cpu());
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        for kind in [DeviceKind::Cpu, DeviceKind::Cuda, DeviceKind::Metal] {
            assert_eq!(kind.to_string().parse::<DeviceKind>().unwrap(), kind);
        }
    }
}
