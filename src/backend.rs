//! Backend selection via feature flags
//!
//! Usage:
//! - `cargo run --release` → `NdArray` (default, CPU)
//! - `cargo run --release --features wgpu` → WGPU (cross-platform GPU)
//! - `cargo run --release --features cuda` → CUDA (NVIDIA GPUs)
//!
//! The policy network is tiny and evaluated one observation at a time, so the
//! CPU backend is usually the fastest choice.

use burn::backend::Autodiff;
use burn::tensor::backend::Backend;

pub type Device = <TrainingBackend as Backend>::Device;

// CUDA backend (highest priority)
#[cfg(feature = "cuda")]
pub type TrainingBackend = Autodiff<burn::backend::Cuda>;

#[cfg(feature = "cuda")]
pub fn init_device() -> Device {
    burn::backend::cuda::CudaDevice::default()
}

#[cfg(feature = "cuda")]
pub fn backend_name() -> &'static str {
    "CUDA"
}

// WGPU backend (second priority)
#[cfg(all(feature = "wgpu", not(feature = "cuda")))]
pub type TrainingBackend = Autodiff<burn::backend::wgpu::Wgpu>;

#[cfg(all(feature = "wgpu", not(feature = "cuda")))]
pub fn init_device() -> Device {
    burn::backend::wgpu::WgpuDevice::default()
}

#[cfg(all(feature = "wgpu", not(feature = "cuda")))]
pub fn backend_name() -> &'static str {
    "WGPU"
}

// NdArray backend (default)
#[cfg(not(any(feature = "wgpu", feature = "cuda")))]
pub type TrainingBackend = Autodiff<burn::backend::NdArray<f32>>;

#[cfg(not(any(feature = "wgpu", feature = "cuda")))]
pub fn init_device() -> Device {
    burn::backend::ndarray::NdArrayDevice::Cpu
}

#[cfg(not(any(feature = "wgpu", feature = "cuda")))]
pub fn backend_name() -> &'static str {
    "NdArray"
}
