use crate::Heightmap;

/// Triangle mesh built from a heightmap, centred on the origin in the XZ plane.
#[derive(Debug, Clone, Default)]
pub struct TerrainMesh {
    pub positions: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl TerrainMesh {
    /// One vertex per sample at `(i - size/2, h, j - size/2)`, two triangles per quad.
    ///
    /// Vertices are shaded green, brighter with height.
    pub fn from_heightmap(map: &Heightmap) -> Self {
        let size = map.size();
        let half = size as f32 / 2.0;
        let height_scale = map.height_scale() as f32;

        let mut positions = Vec::with_capacity(size * size);
        let mut colors = Vec::with_capacity(size * size);
        for (idx, &h) in map.heights().iter().enumerate() {
            let i = idx / size;
            let j = idx % size;
            positions.push([i as f32 - half, h, j as f32 - half]);
            let t = (h + height_scale) / (2.0 * height_scale);
            colors.push([0.0, 0.3 + t * 0.4, 0.0]);
        }

        let quads = (size - 1) * (size - 1);
        let mut indices = Vec::with_capacity(quads * 6);
        for i in 0..size - 1 {
            for j in 0..size - 1 {
                let a = (i * size + j) as u32;
                let b = a + 1;
                let c = a + size as u32;
                let d = c + 1;
                indices.extend_from_slice(&[a, b, c, b, d, c]);
            }
        }

        Self {
            positions,
            colors,
            indices,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Translucent water quad drawn over the terrain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterPlane {
    pub size: f32,
    pub level: f32,
    pub alpha: f32,
}

impl Default for WaterPlane {
    fn default() -> Self {
        Self {
            size: 128.0,
            level: -2.0,
            alpha: 0.6,
        }
    }
}

impl WaterPlane {
    pub fn color(&self) -> [f32; 4] {
        [0.0, 0.3, 0.8, self.alpha]
    }

    /// Quad corners in winding order.
    pub fn corners(&self) -> [[f32; 3]; 4] {
        let half = self.size / 2.0;
        [
            [-half, self.level, -half],
            [half, self.level, -half],
            [half, self.level, half],
            [-half, self.level, half],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CpuSampler, FractalField, HeightmapParams};

    fn mesh(size: usize) -> TerrainMesh {
        let params = HeightmapParams {
            size,
            ..HeightmapParams::default()
        };
        let mut sampler = CpuSampler::new(FractalField::new(params.fractal_params()).unwrap());
        let map = Heightmap::generate(&mut sampler, &params, 0.0).unwrap();
        TerrainMesh::from_heightmap(&map)
    }

    #[test]
    fn counts_match_grid() {
        let m = mesh(8);
        assert_eq!(m.vertex_count(), 64);
        assert_eq!(m.triangle_count(), 2 * 7 * 7);
        assert!(m.indices.iter().all(|&i| (i as usize) < m.vertex_count()));
    }

    #[test]
    fn first_quad_winding() {
        let m = mesh(4);
        assert_eq!(&m.indices[..6], &[0, 1, 4, 1, 5, 4]);
    }

    #[test]
    fn mesh_is_centred() {
        let m = mesh(4);
        assert_eq!(m.positions[0][0], -2.0);
        assert_eq!(m.positions[0][2], -2.0);
        assert_eq!(m.positions[15][0], 1.0);
    }

    #[test]
    fn color_brightens_with_height() {
        let m = mesh(16);
        let lowest = (0..m.vertex_count())
            .min_by(|&a, &b| m.positions[a][1].total_cmp(&m.positions[b][1]))
            .unwrap();
        let highest = (0..m.vertex_count())
            .max_by(|&a, &b| m.positions[a][1].total_cmp(&m.positions[b][1]))
            .unwrap();
        assert!(m.colors[highest][1] > m.colors[lowest][1]);
        assert!((m.colors[lowest][1] - 0.3).abs() < 1e-4);
        assert!((m.colors[highest][1] - 0.7).abs() < 1e-4);
    }

    #[test]
    fn water_plane_defaults() {
        let water = WaterPlane::default();
        assert_eq!(water.corners()[0], [-64.0, -2.0, -64.0]);
        assert_eq!(water.color()[3], 0.6);
    }
}
