//! The rectangular grid of per-pixel scalar values shared by the luminance and
//! red-saturation channels.

use derive_more::{Deref, DerefMut};


/// A `width` by `height` grid of 32-bit floats, produced by [`crate::luminance`] or
/// [`crate::redsat`] and consumed by [`crate::diff::FrameDifferencer`] and
/// [`crate::pattern`].
///
/// Derefs to the backing `[f32]` so elementwise iteration doesn't need a dedicated API.
#[derive(Debug, Clone, PartialEq, Deref, DerefMut)]
pub struct ScalarField {
    width: usize,
    height: usize,
    #[deref]
    #[deref_mut]
    values: Vec<f32>,
}

impl ScalarField {
    /// Creates a field of the given dimensions, with every pixel set to `fill`.
    pub fn filled(width: usize, height: usize, fill: f32) -> Self {
        ScalarField { width, height, values: vec![fill; width * height] }
    }

    /// Creates a field from already-computed row-major pixel values.
    ///
    /// Panics if `values.len() != width * height`.
    pub fn from_values(width: usize, height: usize, values: Vec<f32>) -> Self {
        assert_eq!(values.len(), width * height, "scalar field size mismatch");
        ScalarField { width, height, values }
    }

    /// The field's width, in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The field's height, in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of pixels (`width * height`).
    pub fn total_pixels(&self) -> usize {
        self.width * self.height
    }

    /// Reads the value at `(x, y)`, in row-major order.
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.values[y * self.width + x]
    }

    /// Writes the value at `(x, y)`, in row-major order.
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        self.values[y * self.width + x] = value;
    }

    /// The arithmetic mean over all pixels.
    pub fn mean(&self) -> f32 {
        if self.values.is_empty() {
            0.0
        } else {
            self.values.iter().sum::<f32>() / self.values.len() as f32
        }
    }

    /// Elementwise `self - other`. Dimensions must match.
    pub fn difference(&self, other: &ScalarField) -> ScalarField {
        assert_eq!(self.width, other.width, "scalar field width mismatch");
        assert_eq!(self.height, other.height, "scalar field height mismatch");
        let values = self.values.iter().zip(&other.values).map(|(a, b)| a - b).collect();
        ScalarField { width: self.width, height: self.height, values }
    }

    /// Count of pixels that are not exactly zero.
    pub fn count_nonzero(&self) -> usize {
        self.values.iter().filter(|&&v| v != 0.0).count()
    }
}
