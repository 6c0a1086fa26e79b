//! Rendering statistics.

/// Statistics from one render call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Draw calls collected.
    pub draw_calls: u32,
    /// Shader runs executed.
    pub shader_runs: u32,
    /// Shader runs skipped because the shader did not resolve.
    pub skipped_runs: u32,
    /// Forward passes executed.
    pub forward_passes: u32,
    /// Deferred passes executed.
    pub deferred_passes: u32,
    /// Compute passes executed.
    pub compute_passes: u32,
    /// Filter passes executed.
    pub filter_passes: u32,
    /// Filters skipped because they did not resolve.
    pub skipped_filters: u32,
    /// Plugin binds issued.
    pub plugin_binds: u32,
    /// Material binds issued.
    pub material_binds: u32,
    /// Directional lights gathered.
    pub directional_lights: u32,
    /// Point lights inside the frustum.
    pub visible_point_lights: u32,
    /// Point lights culled.
    pub culled_point_lights: u32,
    /// Spot lights inside the frustum.
    pub visible_spot_lights: u32,
    /// Spot lights culled.
    pub culled_spot_lights: u32,
    /// Light index entries across all tiles.
    pub tile_light_entries: u32,
    /// Tiles whose light lists were cut at the 16-bit limit.
    pub truncated_tiles: u32,
    /// Buffer uploads skipped after a device failure.
    pub skipped_uploads: u32,
    /// Light-related GPU buffers created or grown.
    pub buffer_allocations: u32,
    /// Whether the light buffers were built.
    pub lighting: bool,
    /// Whether the image was composited onto a camera target.
    pub composited: bool,
}

impl FrameStats {
    /// Passes executed, filters included.
    #[must_use]
    pub const fn total_passes(&self) -> u32 {
        self.forward_passes + self.deferred_passes + self.compute_passes + self.filter_passes
    }

    /// Lights gathered across all types.
    #[must_use]
    pub const fn total_lights(&self) -> u32 {
        self.directional_lights + self.visible_point_lights + self.visible_spot_lights
    }
}

/// Statistics accumulated over the renderer's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RendererStats {
    /// Calls to `render_frame`.
    pub frames: u64,
    /// Render calls processed.
    pub render_calls: u64,
    /// Draw calls processed.
    pub draw_calls: u64,
    /// Passes executed.
    pub passes: u64,
    /// Shader runs skipped.
    pub skipped_runs: u64,
    /// Uploads skipped.
    pub skipped_uploads: u64,
    /// Tiles truncated.
    pub truncated_tiles: u64,
    /// Light-related GPU buffer allocations.
    pub buffer_allocations: u64,
}

impl RendererStats {
    /// Adds one render call.
    pub fn accumulate(&mut self, frame: &FrameStats) {
        self.render_calls += 1;
        self.draw_calls += u64::from(frame.draw_calls);
        self.passes += u64::from(frame.total_passes());
        self.skipped_runs += u64::from(frame.skipped_runs);
        self.skipped_uploads += u64::from(frame.skipped_uploads);
        self.truncated_tiles += u64::from(frame.truncated_tiles);
        self.buffer_allocations += u64::from(frame.buffer_allocations);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulate() {
        let frame = FrameStats {
            draw_calls: 4,
            forward_passes: 2,
            filter_passes: 1,
            skipped_runs: 1,
            ..FrameStats::default()
        };
        let mut stats = RendererStats::default();
        stats.accumulate(&frame);
        stats.accumulate(&frame);

        assert_eq!(stats.render_calls, 2);
        assert_eq!(stats.draw_calls, 8);
        assert_eq!(stats.passes, 6);
        assert_eq!(stats.skipped_runs, 2);
    }
}
