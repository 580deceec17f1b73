//! Render target abstraction
//!
//! The engine treats the display as a write-only character grid. Nothing is
//! ever read back; a backend may buffer internally and flush on
//! [`Renderer::present`]. Pixel-level layout, fonts, and bus details belong
//! to the backend implementation.

/// Render backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderError {
    /// Communication error with the display
    Communication,
    /// Coordinates outside the backend's grid
    InvalidCoordinates,
    /// Backend buffer exhausted
    BufferOverflow,
    /// Display not initialized or powered down
    NotReady,
}

/// Write-only render target
///
/// A frame is: `clear`, any number of draw calls, `present`. The router
/// drives exactly one frame per dispatched `Draw` event.
pub trait Renderer {
    /// Clear the frame buffer
    fn clear(&mut self) -> Result<(), RenderError>;

    /// Draw text at a character cell, row-major from the top-left
    fn draw_text(&mut self, row: u8, col: u8, text: &str) -> Result<(), RenderError>;

    /// Invert a span of cells on one row (selection/edit highlighting)
    fn invert_region(&mut self, row: u8, start_col: u8, end_col: u8) -> Result<(), RenderError>;

    /// Flush the frame to the hardware
    fn present(&mut self) -> Result<(), RenderError>;

    /// Grid size as (columns, rows)
    fn dimensions(&self) -> (u8, u8);
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use heapless::{String, Vec};

    /// Recording renderer for deterministic tests
    ///
    /// Captures draw calls as `(row, col, text)` plus frame bookkeeping.
    #[derive(Debug, Default)]
    pub struct RecordingRenderer {
        pub lines: Vec<(u8, u8, String<32>), 16>,
        pub inverts: Vec<(u8, u8, u8), 16>,
        pub clears: usize,
        pub presents: usize,
    }

    impl RecordingRenderer {
        pub fn new() -> Self {
            Self::default()
        }

        /// Concatenated text drawn on a display row this frame
        pub fn row_text(&self, row: u8) -> String<64> {
            let mut out = String::new();
            for (r, _, text) in &self.lines {
                if *r == row {
                    let _ = out.push_str(text);
                }
            }
            out
        }
    }

    impl Renderer for RecordingRenderer {
        fn clear(&mut self) -> Result<(), RenderError> {
            self.clears += 1;
            self.lines.clear();
            self.inverts.clear();
            Ok(())
        }

        fn draw_text(&mut self, row: u8, col: u8, text: &str) -> Result<(), RenderError> {
            let mut line = String::new();
            let text = if text.len() > 32 { &text[..32] } else { text };
            let _ = line.push_str(text);
            self.lines
                .push((row, col, line))
                .map_err(|_| RenderError::BufferOverflow)
        }

        fn invert_region(&mut self, row: u8, start_col: u8, end_col: u8) -> Result<(), RenderError> {
            self.inverts
                .push((row, start_col, end_col))
                .map_err(|_| RenderError::BufferOverflow)
        }

        fn present(&mut self) -> Result<(), RenderError> {
            self.presents += 1;
            Ok(())
        }

        fn dimensions(&self) -> (u8, u8) {
            (21, 8)
        }
    }
}
