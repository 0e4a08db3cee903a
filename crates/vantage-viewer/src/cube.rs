use vantage_engine::render::MeshVertex;

const fn v(x: f32, y: f32, z: f32, u: f32, w: f32) -> MeshVertex {
    MeshVertex::new(x, y, z, u, w)
}

/// Unit cube spanning `[-1, 1]` on every axis, counter-clockwise faces.
pub const VERTICES: [MeshVertex; 36] = [
    // Bottom
    v(-1.0, -1.0, -1.0, 0.0, 0.0),
    v(1.0, -1.0, -1.0, 1.0, 0.0),
    v(-1.0, -1.0, 1.0, 0.0, 1.0),
    v(1.0, -1.0, -1.0, 1.0, 0.0),
    v(1.0, -1.0, 1.0, 1.0, 1.0),
    v(-1.0, -1.0, 1.0, 0.0, 1.0),
    // Top
    v(-1.0, 1.0, -1.0, 0.0, 0.0),
    v(-1.0, 1.0, 1.0, 0.0, 1.0),
    v(1.0, 1.0, -1.0, 1.0, 0.0),
    v(1.0, 1.0, -1.0, 1.0, 0.0),
    v(-1.0, 1.0, 1.0, 0.0, 1.0),
    v(1.0, 1.0, 1.0, 1.0, 1.0),
    // Front
    v(-1.0, -1.0, 1.0, 1.0, 0.0),
    v(1.0, -1.0, 1.0, 0.0, 0.0),
    v(-1.0, 1.0, 1.0, 1.0, 1.0),
    v(1.0, -1.0, 1.0, 0.0, 0.0),
    v(1.0, 1.0, 1.0, 0.0, 1.0),
    v(-1.0, 1.0, 1.0, 1.0, 1.0),
    // Back
    v(-1.0, -1.0, -1.0, 0.0, 0.0),
    v(-1.0, 1.0, -1.0, 0.0, 1.0),
    v(1.0, -1.0, -1.0, 1.0, 0.0),
    v(1.0, -1.0, -1.0, 1.0, 0.0),
    v(-1.0, 1.0, -1.0, 0.0, 1.0),
    v(1.0, 1.0, -1.0, 1.0, 1.0),
    // Left
    v(-1.0, -1.0, 1.0, 0.0, 1.0),
    v(-1.0, 1.0, -1.0, 1.0, 0.0),
    v(-1.0, -1.0, -1.0, 0.0, 0.0),
    v(-1.0, -1.0, 1.0, 0.0, 1.0),
    v(-1.0, 1.0, 1.0, 1.0, 1.0),
    v(-1.0, 1.0, -1.0, 1.0, 0.0),
    // Right
    v(1.0, -1.0, 1.0, 1.0, 1.0),
    v(1.0, -1.0, -1.0, 1.0, 0.0),
    v(1.0, 1.0, -1.0, 0.0, 0.0),
    v(1.0, -1.0, 1.0, 1.0, 1.0),
    v(1.0, 1.0, -1.0, 0.0, 0.0),
    v(1.0, 1.0, 1.0, 0.0, 1.0),
];

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn faces_wind_counter_clockwise_from_outside() {
        for tri in VERTICES.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|v| Vec3::from(v.pos));
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0, "inward face at {centroid:?}");
        }
    }

    #[test]
    fn uvs_are_normalized() {
        for v in VERTICES {
            assert!(v.uv.iter().all(|c| (0.0..=1.0).contains(c)));
        }
    }
}
