//! # Rendering Error Types
//!
//! Errors surface from construction and from individual units of work. The
//! per-frame path converts them into log lines and skipped work.

use lumina_core::PoolError;
use thiserror::Error;

use crate::device::DeviceError;
use crate::shader::{FilterHandle, ShaderHandle};

/// Errors that can occur in the renderer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// A shader handle did not resolve to a live shader.
    #[error("shader not found: {0:?}")]
    ShaderMissing(ShaderHandle),

    /// A filter handle did not resolve to a live filter.
    #[error("filter not found: {0:?}")]
    FilterMissing(FilterHandle),

    /// The device failed to create a buffer.
    #[error("failed to create buffer '{label}': {reason}")]
    BufferCreate {
        /// Buffer label.
        label: &'static str,
        /// Device-reported reason.
        reason: DeviceError,
    },

    /// The device failed to map a buffer for writing.
    #[error("failed to map buffer '{label}': {reason}")]
    BufferMap {
        /// Buffer label.
        label: &'static str,
        /// Device-reported reason.
        reason: DeviceError,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A lighting job failed on the worker pool.
    #[error("worker pool failure: {0}")]
    Pool(#[from] PoolError),
}

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;
