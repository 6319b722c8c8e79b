//! Precomputed 8-bit-to-sRGB lookup table.

use crate::frame::{Frame, SrgbFrame};

#[cfg(test)]
mod tests;

/// A precomputed lookup from an 8-bit channel value to its normalised sRGB intensity.
///
/// Construction applies the standard sRGB gamma curve once per byte value; afterwards,
/// [`ColourTable::lookup`] is a constant-time array read. The table is immutable once
/// built and may be shared freely across streams.
#[derive(Debug, Clone)]
pub struct ColourTable {
    entries: [f32; 256],
}

impl ColourTable {
    /// Builds the lookup table by applying the sRGB gamma curve to each of the 256
    /// possible 8-bit channel values.
    pub fn new() -> Self {
        let mut entries = [0.0f32; 256];
        for (i, entry) in entries.iter_mut().enumerate() {
            let v = i as f32 / 255.0;
            *entry =
                if v <= 0.04045 { v / 12.92 } else { ((v + 0.055) / 1.055).powf(2.4) };
        }
        ColourTable { entries }
    }

    /// Returns the precomputed sRGB value for an 8-bit channel byte.
    pub fn lookup(&self, channel_byte: u8) -> f32 {
        self.entries[channel_byte as usize]
    }

    /// Converts every channel of a decoded BGR frame through this table.
    pub fn convert(&self, frame: &Frame) -> SrgbFrame {
        let channels = frame
            .pixels
            .chunks_exact(3)
            .map(|bgr| (self.lookup(bgr[0]), self.lookup(bgr[1]), self.lookup(bgr[2])))
            .collect();
        SrgbFrame::new(frame.width, frame.height, channels)
    }
}

impl Default for ColourTable {
    fn default() -> Self {
        Self::new()
    }
}
