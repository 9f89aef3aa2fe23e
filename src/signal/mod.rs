//! Per-signal runtime state
//!
//! Holds the most recent buffer of a signal plus its vertical view: the
//! zoom level (fraction of the full Y range visible) and display offset
//! (normalized position of the bottom of the visible slice).

use crate::error::GraphError;
use crate::input::InputListener;

/// Current buffer and vertical view of one signal
#[derive(Debug, Clone, PartialEq)]
pub struct SignalBufferState {
    buffer: Vec<f32>,
    /// Last announced block size, 0 if none yet
    block_size: usize,
    zoom_level_percentage: f32,
    display_offset_percentage: f32,
}

impl Default for SignalBufferState {
    fn default() -> Self {
        Self {
            buffer: Vec::new(),
            block_size: 0,
            zoom_level_percentage: 1.0,
            display_offset_percentage: 0.0,
        }
    }
}

impl SignalBufferState {
    /// Empty state at full scale (zoom 1.0, offset 0.0)
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest buffer (empty until the first update after a size change)
    pub fn buffer(&self) -> &[f32] {
        &self.buffer
    }

    /// Replace the buffer directly, outside of an input
    pub fn set_buffer(&mut self, buffer: &[f32]) {
        self.block_size = buffer.len();
        self.buffer.clear();
        self.buffer.extend_from_slice(buffer);
    }

    /// Last announced block size (0 before any announcement)
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Visible fraction of the Y range, `(0, 1]`
    pub fn zoom_level_percentage(&self) -> f32 {
        self.zoom_level_percentage
    }

    /// Normalized Y position of the bottom of the view, `[0, 1]`
    pub fn display_offset_percentage(&self) -> f32 {
        self.display_offset_percentage
    }

    /// Set the zoom level
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` unless `0 < zoom <= 1`.
    pub fn set_zoom_level_percentage(&mut self, zoom: f32) -> Result<(), GraphError> {
        if !(zoom > 0.0 && zoom <= 1.0) {
            return Err(GraphError::InvalidInput(format!(
                "Zoom level must be in (0, 1], got {}",
                zoom
            )));
        }
        self.zoom_level_percentage = zoom;
        Ok(())
    }

    /// Set the display offset
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` unless `0 <= offset <= 1`.
    pub fn set_display_offset_percentage(&mut self, offset: f32) -> Result<(), GraphError> {
        if !(0.0..=1.0).contains(&offset) {
            return Err(GraphError::InvalidInput(format!(
                "Display offset must be in [0, 1], got {}",
                offset
            )));
        }
        self.display_offset_percentage = offset;
        Ok(())
    }

    /// Set zoom and offset together; neither changes if either is invalid
    pub fn set_view(&mut self, zoom: f32, offset: f32) -> Result<(), GraphError> {
        let mut next = self.clone();
        next.set_zoom_level_percentage(zoom)?;
        next.set_display_offset_percentage(offset)?;
        self.zoom_level_percentage = next.zoom_level_percentage;
        self.display_offset_percentage = next.display_offset_percentage;
        Ok(())
    }

    /// Back to full scale
    pub fn reset_view(&mut self) {
        self.zoom_level_percentage = 1.0;
        self.display_offset_percentage = 0.0;
    }

    /// Visible slice of the normalized Y range as `(bottom, top)`
    pub fn visible_range(&self) -> (f32, f32) {
        let bottom = self.display_offset_percentage;
        (bottom, bottom + self.zoom_level_percentage)
    }
}

impl InputListener for SignalBufferState {
    fn on_block_size_changed(&mut self, block_size: usize) {
        self.block_size = block_size;
        self.buffer.clear();
    }

    fn on_buffer_updated(&mut self, buffer: &[f32]) {
        if self.block_size != 0 && buffer.len() != self.block_size {
            log::warn!(
                "Ignoring {}-sample buffer, announced block size is {}",
                buffer.len(),
                self.block_size
            );
            return;
        }
        self.buffer.clear();
        self.buffer.extend_from_slice(buffer);
    }

    fn on_removed(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_full_scale() {
        let state = SignalBufferState::new();
        assert_eq!(state.zoom_level_percentage(), 1.0);
        assert_eq!(state.display_offset_percentage(), 0.0);
        assert_eq!(state.visible_range(), (0.0, 1.0));
        assert!(state.buffer().is_empty());
    }

    #[test]
    fn test_zoom_and_offset_ranges() {
        let mut state = SignalBufferState::new();
        assert!(state.set_zoom_level_percentage(0.0).is_err());
        assert!(state.set_zoom_level_percentage(1.5).is_err());
        assert!(state.set_zoom_level_percentage(f32::NAN).is_err());
        assert!(state.set_display_offset_percentage(-0.1).is_err());
        assert!(state.set_display_offset_percentage(1.1).is_err());

        state.set_zoom_level_percentage(0.25).unwrap();
        state.set_display_offset_percentage(0.5).unwrap();
        assert_eq!(state.visible_range(), (0.5, 0.75));

        state.reset_view();
        assert_eq!(state.visible_range(), (0.0, 1.0));
    }

    #[test]
    fn test_set_view_is_atomic() {
        let mut state = SignalBufferState::new();
        assert!(state.set_view(0.5, 2.0).is_err());
        assert_eq!(state.zoom_level_percentage(), 1.0);

        state.set_view(0.5, 0.25).unwrap();
        assert_eq!(state.visible_range(), (0.25, 0.75));
    }

    #[test]
    fn test_block_size_change_discards_buffer() {
        let mut state = SignalBufferState::new();
        state.on_block_size_changed(3);
        state.on_buffer_updated(&[1.0, 2.0, 3.0]);
        assert_eq!(state.buffer(), &[1.0, 2.0, 3.0]);

        state.on_block_size_changed(5);
        assert!(state.buffer().is_empty());
        assert_eq!(state.block_size(), 5);
    }

    #[test]
    fn test_mismatched_buffer_ignored() {
        let mut state = SignalBufferState::new();
        state.on_block_size_changed(4);
        state.on_buffer_updated(&[1.0, 2.0]);
        assert!(state.buffer().is_empty());
    }

    #[test]
    fn test_view_survives_buffer_updates() {
        let mut state = SignalBufferState::new();
        state.set_view(0.5, 0.1).unwrap();
        state.on_block_size_changed(2);
        state.on_buffer_updated(&[0.0, 1.0]);
        assert_eq!(state.zoom_level_percentage(), 0.5);
        assert_eq!(state.display_offset_percentage(), 0.1);
    }
}
