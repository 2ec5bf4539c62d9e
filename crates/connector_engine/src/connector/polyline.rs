//! Rendered polyline buffers

use crate::foundation::math::Point3;

/// Flat vertex buffers of a connector line
///
/// `positions` always holds exactly three floats per point and at least two
/// points. Replacing the buffers drops the previous ones and bumps
/// [`generation`](Self::generation) so the renderer knows to re-upload.
#[derive(Debug, Clone, PartialEq)]
pub struct PolylineGeometry {
    positions: Vec<f32>,
    colors: Vec<f32>,
    line_distances: Vec<f32>,
    generation: u64,
}

impl PolylineGeometry {
    /// Build buffers for the given points
    pub fn from_points(points: &[Point3], color: [f32; 3]) -> Self {
        let mut geometry = Self {
            positions: Vec::new(),
            colors: Vec::new(),
            line_distances: Vec::new(),
            generation: 0,
        };
        geometry.fill(points, color);
        geometry
    }

    /// Replace all buffers; returns the new generation
    pub fn replace(&mut self, points: &[Point3], color: [f32; 3]) -> u64 {
        self.fill(points, color);
        self.generation += 1;
        self.generation
    }

    fn fill(&mut self, points: &[Point3], color: [f32; 3]) {
        debug_assert!(points.len() >= 2, "a polyline needs at least two points");

        self.positions = points.iter().flat_map(|p| [p.x, p.y, p.z]).collect();
        self.colors = points.iter().flat_map(|_| color).collect();

        // Cumulative distance per vertex, needed for dashed rendering
        let mut travelled = 0.0;
        self.line_distances = std::iter::once(0.0)
            .chain(points.windows(2).map(|pair| {
                travelled += (pair[1] - pair[0]).norm();
                travelled
            }))
            .take(points.len())
            .collect();
    }

    /// Flat xyz buffer
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Flat rgb buffer
    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    /// Cumulative distance of every vertex from the first one
    pub fn line_distances(&self) -> &[f32] {
        &self.line_distances
    }

    /// Number of rendered points
    pub fn point_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Decoded points
    pub fn points(&self) -> Vec<Point3> {
        self.positions
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect()
    }

    /// Position buffer as raw bytes for upload
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Incremented on every [`replace`](Self::replace)
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
