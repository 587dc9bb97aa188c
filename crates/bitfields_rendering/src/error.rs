//! # Render Error Types

use thiserror::Error;

/// Errors raised while creating GPU resources.
#[derive(Error, Debug)]
pub enum RenderError {
    /// No adapter matched the request.
    #[error("no compatible GPU adapter found")]
    NoAdapter,

    /// The adapter refused to create a device.
    #[error("failed to request GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    /// The backend cannot sample integer 3D textures.
    #[error("backend lacks integer 3D texture sampling")]
    VolumeSamplingUnsupported,

    /// A grid axis exceeds the device's 3D texture limit.
    #[error("volume axis {axis} exceeds max 3D texture dimension {limit}")]
    VolumeTooLarge {
        /// Longest grid axis.
        axis: u32,
        /// Device limit.
        limit: u32,
    },

    /// The instance buffer would exceed the device's buffer limit.
    #[error("instance buffer of {bytes} bytes exceeds device limit {limit}")]
    InstanceBufferTooLarge {
        /// Requested size.
        bytes: u64,
        /// Device limit.
        limit: u64,
    },
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
