use gridscape::Vec3;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Camera {
    eye: Vec3,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    // 1 / tan(fov / 2)
    focal: f32,
    near: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Projected {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) depth: f32,
}

impl Camera {
    /// Perspective camera with a vertical field of view in degrees.
    pub(crate) fn look_at(eye: Vec3, target: Vec3, fov_deg: f32) -> Self {
        let forward = target.sub(eye).norm();
        let world_up = Vec3::new(0.0, 1.0, 0.0);
        let right = forward.cross(world_up).norm();
        let up = right.cross(forward);
        Self {
            eye,
            forward,
            right,
            up,
            focal: 1.0 / (fov_deg.to_radians() * 0.5).tan(),
            near: 0.1,
        }
    }

    /// Maps a world point onto a `w`×`h` pixel canvas, y down.
    pub(crate) fn project(&self, p: Vec3, w: f32, h: f32) -> Option<Projected> {
        let d = p.sub(self.eye);
        let depth = d.dot(self.forward);
        if depth <= self.near {
            return None;
        }
        let aspect = if h > 0.0 { w / h } else { 1.0 };
        let nx = d.dot(self.right) * self.focal / (depth * aspect);
        let ny = d.dot(self.up) * self.focal / depth;
        Some(Projected {
            x: (nx + 1.0) * 0.5 * w,
            y: (1.0 - ny) * 0.5 * h,
            depth,
        })
    }

    /// Pixel diameter of a world-space size seen at `depth`.
    pub(crate) fn pixel_size(&self, size: f32, depth: f32, h: f32) -> f32 {
        size * self.focal / depth.max(self.near) * h * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_projects_to_centre() {
        let cam = Camera::look_at(Vec3::new(15.0, 2.0, 0.0), Vec3::ZERO, 75.0);
        let p = cam.project(Vec3::ZERO, 200.0, 100.0).unwrap();
        assert!((p.x - 100.0).abs() < 1e-3);
        assert!((p.y - 50.0).abs() < 1e-3);
    }

    #[test]
    fn points_behind_are_culled() {
        let cam = Camera::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 75.0);
        assert!(cam.project(Vec3::new(0.0, 0.0, 6.0), 100.0, 100.0).is_none());
    }

    #[test]
    fn up_and_right_map_to_screen_axes() {
        let cam = Camera::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 75.0);
        let up = cam.project(Vec3::new(0.0, 1.0, 0.0), 100.0, 100.0).unwrap();
        let right = cam.project(Vec3::new(1.0, 0.0, 0.0), 100.0, 100.0).unwrap();
        assert!(up.y < 50.0);
        assert!(right.x > 50.0);
    }
}
