//! # Renderer Configuration
//!
//! Loaded once at startup from TOML. Every field has a default, so an empty
//! document yields [`RendererConfig::default`].
//!
//! ```toml
//! worker_threads = 3
//! parallel_slices = true
//! buffer_growth = "power_of_two"
//!
//! [grid]
//! width = 16
//! height = 8
//! depth = 24
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::clustering::GridDimensions;
use crate::error::{RenderError, RenderResult};

/// How a GPU buffer picks its new capacity when it must grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferGrowth {
    /// Grow to exactly the required element count.
    Exact,
    /// Grow to the next power of two at or above the required count.
    #[default]
    PowerOfTwo,
}

impl BufferGrowth {
    /// Returns the capacity to allocate for `required` elements.
    #[must_use]
    pub fn capacity_for(self, required: usize, minimum: usize) -> usize {
        let required = required.max(minimum).max(1);
        match self {
            Self::Exact => required,
            Self::PowerOfTwo => required.checked_next_power_of_two().unwrap_or(required),
        }
    }
}

/// Renderer configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RendererConfig {
    /// Light cluster grid dimensions.
    pub grid: GridDimensions,
    /// Worker threads used for the lighting gather tasks.
    pub worker_threads: usize,
    /// Fan the z-slice loop of cluster assignment out across cores.
    pub parallel_slices: bool,
    /// Minimum element capacity of a light buffer on first creation.
    pub initial_light_capacity: usize,
    /// Minimum element capacity of the light index buffer on first creation.
    pub initial_index_capacity: usize,
    /// Growth policy for every light-related GPU buffer.
    pub buffer_growth: BufferGrowth,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            grid: GridDimensions::default(),
            worker_threads: 3,
            parallel_slices: true,
            initial_light_capacity: 16,
            initial_index_capacity: 1024,
            buffer_growth: BufferGrowth::PowerOfTwo,
        }
    }
}

impl RendererConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`RenderError::InvalidConfig`] on a parse failure or a value that
    /// fails validation.
    pub fn from_toml_str(source: &str) -> RenderResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| RenderError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`RenderError::InvalidConfig`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> RenderResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            RenderError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&source)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// [`RenderError::InvalidConfig`] naming the offending field.
    pub fn validate(&self) -> RenderResult<()> {
        self.grid.validate()?;
        if self.worker_threads == 0 {
            return Err(RenderError::InvalidConfig(
                "worker_threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
