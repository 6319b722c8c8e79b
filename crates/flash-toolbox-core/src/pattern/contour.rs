//! Connected-component extraction and shape-similarity grouping over a binary mask.
//!
//! This stands in for the original contour/Hu-moment pipeline: rather than tracing
//! polygon boundaries, each connected region of set pixels is treated as a component,
//! and a normalised central-moment descriptor plays the role Hu moments play in the
//! source material for comparing two components' shape.

use std::collections::VecDeque;

/// One connected region of set pixels in a binary mask.
#[derive(Debug, Clone)]
pub(crate) struct Component {
    pub(crate) pixels: Vec<(usize, usize)>,
    pub(crate) area: usize,
}

impl Component {
    fn bounds(&self) -> (usize, usize, usize, usize) {
        let mut min_x = usize::MAX;
        let mut min_y = usize::MAX;
        let mut max_x = 0;
        let mut max_y = 0;
        for &(x, y) in &self.pixels {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        (min_x, min_y, max_x, max_y)
    }

    /// Axis-aligned bounding rectangle area, in pixels.
    pub(crate) fn bounding_rect_area(&self) -> usize {
        let (min_x, min_y, max_x, max_y) = self.bounds();
        (max_x - min_x + 1) * (max_y - min_y + 1)
    }

    /// A normalised central-moment descriptor used as a cheap analogue of Hu moments:
    /// the centroid-relative second-order moments, scaled by area so that congruent
    /// shapes of different sizes compare as similar.
    fn shape_descriptor(&self) -> [f64; 3] {
        let n = self.pixels.len() as f64;
        let (cx, cy) = self.pixels.iter().fold((0.0, 0.0), |(sx, sy), &(x, y)| {
            (sx + x as f64, sy + y as f64)
        });
        let (cx, cy) = (cx / n, cy / n);

        let (mut mu20, mut mu02, mut mu11) = (0.0, 0.0, 0.0);
        for &(x, y) in &self.pixels {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            mu20 += dx * dx;
            mu02 += dy * dy;
            mu11 += dx * dy;
        }
        let scale = n * n;
        [mu20 / scale, mu02 / scale, mu11 / scale]
    }

    /// A Euclidean shape-match distance between two components' descriptors, playing
    /// the role of the source's Hu-moment shape-match distance.
    pub(crate) fn shape_distance(&self, other: &Component) -> f64 {
        let a = self.shape_descriptor();
        let b = other.shape_descriptor();
        a.iter().zip(&b).map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt()
    }
}

/// Finds 4-connected components of `true` pixels in `mask`, via flood fill.
pub(crate) fn find_components(mask: &[bool], width: usize, height: usize) -> Vec<Component> {
    let mut visited = vec![false; mask.len()];
    let mut components = Vec::new();

    for start_y in 0..height {
        for start_x in 0..width {
            let start_idx = start_y * width + start_x;
            if visited[start_idx] || !mask[start_idx] {
                continue;
            }

            let mut pixels = Vec::new();
            let mut queue = VecDeque::new();
            queue.push_back((start_x, start_y));
            visited[start_idx] = true;

            while let Some((x, y)) = queue.pop_front() {
                pixels.push((x, y));
                let neighbours = [
                    (x.wrapping_sub(1), y),
                    (x + 1, y),
                    (x, y.wrapping_sub(1)),
                    (x, y + 1),
                ];
                for (nx, ny) in neighbours {
                    if nx >= width || ny >= height {
                        continue;
                    }
                    let idx = ny * width + nx;
                    if !visited[idx] && mask[idx] {
                        visited[idx] = true;
                        queue.push_back((nx, ny));
                    }
                }
            }

            let area = pixels.len();
            components.push(Component { pixels, area });
        }
    }
    components
}

/// Shape-similarity threshold below which two components are grouped together.
const SIMILARITY_THRESHOLD: f64 = 0.7;

/// Minimum component count past which grouping by shape similarity is attempted,
/// rather than simply taking the single largest component.
const GROUPING_MIN_COMPONENTS: usize = 5;

/// Chooses the components that make up the candidate pattern region: the single
/// largest component if there are fewer than [`GROUPING_MIN_COMPONENTS`] surviving
/// components, otherwise the largest group of mutually similar-shaped components.
pub(crate) fn select_pattern_components(components: &[Component]) -> Vec<&Component> {
    if components.is_empty() {
        return Vec::new();
    }
    if components.len() < GROUPING_MIN_COMPONENTS {
        let biggest = components.iter().max_by_key(|c| c.area).expect("non-empty");
        return vec![biggest];
    }

    let mut best_group: Vec<&Component> = Vec::new();
    for seed in components {
        let group: Vec<&Component> =
            components.iter().filter(|c| seed.shape_distance(c) < SIMILARITY_THRESHOLD).collect();
        if group.len() > best_group.len() {
            best_group = group;
        }
    }
    best_group
}
