use crate::math::Vec3;
use crate::noise::{NoiseField, NoiseParams};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Cells per side; each family gets `divisions + 1` lines.
    pub divisions: usize,
    pub spacing: f32,
    /// Segments per line; each line gets `segments + 1` vertices.
    pub segments: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            divisions: 20,
            spacing: 2.0,
            segments: 50,
        }
    }
}

impl GridConfig {
    pub fn extent(&self) -> f32 {
        self.divisions as f32 * self.spacing
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineFamily {
    /// Runs along x at a fixed z.
    AlongX,
    /// Runs along z at a fixed x.
    AlongZ,
}

#[derive(Clone, Debug)]
pub struct GridLine {
    family: LineFamily,
    // (x, z) per vertex, fixed at construction
    anchors: Vec<(f32, f32)>,
    positions: Vec<Vec3>,
}

impl GridLine {
    fn new(family: LineFamily, anchors: Vec<(f32, f32)>, noise: &NoiseField) -> Self {
        let positions = anchors
            .iter()
            .map(|&(x, z)| Vec3::new(x, noise.height(x, z, 0.0), z))
            .collect();
        Self {
            family,
            anchors,
            positions,
        }
    }

    fn recompute(&mut self, noise: &NoiseField, progress: f32) {
        for (p, &(x, z)) in self.positions.iter_mut().zip(&self.anchors) {
            *p = Vec3::new(x, noise.height(x, z, progress), z);
        }
    }

    pub fn family(&self) -> LineFamily {
        self.family
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Two orthogonal families of poly-lines draped over a [`NoiseField`].
pub struct TerrainMesh {
    noise: NoiseField,
    lines: Vec<GridLine>,
    progress: f32,
    dirty: bool,
}

impl TerrainMesh {
    pub fn new(grid: GridConfig, noise: NoiseParams) -> Self {
        let extent = grid.extent();
        let offset = extent / 2.0;
        let noise = NoiseField::new(noise, extent);
        let segs = grid.segments.max(1);

        let mut lines = Vec::with_capacity((grid.divisions + 1) * 2);
        for i in 0..=grid.divisions {
            let z = i as f32 * grid.spacing - offset;
            let anchors = (0..=segs)
                .map(|j| (-offset + (j as f32 / segs as f32) * extent, z))
                .collect();
            lines.push(GridLine::new(LineFamily::AlongX, anchors, &noise));
        }
        for i in 0..=grid.divisions {
            let x = i as f32 * grid.spacing - offset;
            let anchors = (0..=segs)
                .map(|j| (x, -offset + (j as f32 / segs as f32) * extent))
                .collect();
            lines.push(GridLine::new(LineFamily::AlongZ, anchors, &noise));
        }

        Self {
            noise,
            lines,
            progress: 0.0,
            dirty: true,
        }
    }

    /// Full recompute of every vertex height. `scroll_progress` must already
    /// be clamped to `[0, 1]`.
    pub fn update(&mut self, scroll_progress: f32) {
        for line in &mut self.lines {
            line.recompute(&self.noise, scroll_progress);
        }
        self.progress = scroll_progress;
        self.dirty = true;
    }

    pub fn lines(&self) -> &[GridLine] {
        &self.lines
    }

    pub fn family(&self, family: LineFamily) -> impl Iterator<Item = &GridLine> {
        self.lines.iter().filter(move |l| l.family == family)
    }

    pub fn vertex_count(&self) -> usize {
        self.lines.iter().map(GridLine::len).sum()
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clears the upload flag, returning whether it was set.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh() -> TerrainMesh {
        TerrainMesh::new(GridConfig::default(), NoiseParams::default())
    }

    #[test]
    fn reference_grid_dimensions() {
        let m = mesh();
        assert_eq!(m.family(LineFamily::AlongX).count(), 21);
        assert_eq!(m.family(LineFamily::AlongZ).count(), 21);
        assert!(m.lines().iter().all(|l| l.len() == 51));
        assert_eq!(m.vertex_count(), 42 * 51);
    }

    #[test]
    fn lines_span_the_full_extent() {
        let m = mesh();
        let first = &m.lines()[0];
        assert_eq!(first.family(), LineFamily::AlongX);
        assert!((first.positions()[0].x + 20.0).abs() < 1e-5);
        assert!((first.positions()[50].x - 20.0).abs() < 1e-5);
        assert!((first.positions()[0].z + 20.0).abs() < 1e-5);
    }

    #[test]
    fn starts_flat() {
        let m = mesh();
        for line in m.lines() {
            assert!(line.positions().iter().all(|p| p.y == 0.0));
        }
    }

    #[test]
    fn update_only_moves_heights() {
        let mut m = mesh();
        let before: Vec<Vec<(f32, f32)>> = m
            .lines()
            .iter()
            .map(|l| l.positions().iter().map(|p| (p.x, p.z)).collect())
            .collect();

        for p in [0.3, 1.0, 0.0, 0.7] {
            m.update(p);
            let after: Vec<Vec<(f32, f32)>> = m
                .lines()
                .iter()
                .map(|l| l.positions().iter().map(|p| (p.x, p.z)).collect())
                .collect();
            assert_eq!(before, after);
        }
    }

    #[test]
    fn full_progress_raises_terrain_off_the_corridor() {
        let mut m = mesh();
        m.update(1.0);
        let max_y = m
            .lines()
            .iter()
            .flat_map(|l| l.positions().iter())
            .map(|p| p.y)
            .fold(0.0f32, f32::max);
        assert!(max_y > 0.5);

        let r = m.noise().flat_radius();
        for line in m.lines() {
            for p in line.positions() {
                if p.z.abs() <= r {
                    assert_eq!(p.y, 0.0);
                }
            }
        }
    }

    #[test]
    fn update_marks_dirty_and_take_clears() {
        let mut m = mesh();
        assert!(m.take_dirty());
        assert!(!m.is_dirty());
        m.update(0.5);
        assert!(m.is_dirty());
        assert!(m.take_dirty());
        assert!(!m.take_dirty());
        assert_eq!(m.progress(), 0.5);
    }

    #[test]
    fn heights_match_noise_field() {
        let mut m = mesh();
        m.update(0.8);
        for line in m.lines() {
            for p in line.positions() {
                assert_eq!(p.y, m.noise().height(p.x, p.z, 0.8));
            }
        }
    }
}
