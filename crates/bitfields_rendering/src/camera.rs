//! Camera state pushed by the host every frame.

use glam::{Mat4, Vec3};

use crate::bounds::VolumeBounds;

/// Projection and placement of the viewer.
///
/// `world` is the camera-to-world transform (the inverse of the view matrix).
/// Projections follow wgpu clip conventions (depth in `[0, 1]`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    /// View-to-clip transform.
    pub projection: Mat4,
    /// Camera-to-world transform.
    pub world: Mat4,
    /// Camera position in world space.
    pub position: Vec3,
}

impl CameraState {
    /// Perspective camera at `eye` looking at `target`.
    #[must_use]
    pub fn look_at(eye: Vec3, target: Vec3, fov_y_radians: f32, aspect: f32) -> Self {
        let view = Mat4::look_at_rh(eye, target, Vec3::Y);
        Self {
            projection: Mat4::perspective_rh(fov_y_radians, aspect, 0.1, 10_000.0),
            world: view.inverse(),
            position: eye,
        }
    }

    /// Three-quarter view that keeps the whole volume in frame.
    #[must_use]
    pub fn framing(bounds: &VolumeBounds, aspect: f32) -> Self {
        let fov = 50f32.to_radians();
        let radius = bounds.diagonal() * 0.5;
        let distance = radius / (fov * 0.5).sin();
        let eye = bounds.center() + Vec3::new(1.0, 0.8, 1.0).normalize() * distance;
        Self::look_at(eye, bounds.center(), fov, aspect.max(f32::EPSILON))
    }

    /// World-to-view transform.
    #[must_use]
    pub fn view(&self) -> Mat4 {
        self.world.inverse()
    }

    /// World-to-clip transform.
    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view()
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, 60f32.to_radians(), 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitfields_shared::GridDimensions;

    #[test]
    fn test_framing_keeps_corners_in_clip_space() {
        let bounds = VolumeBounds::centered(GridDimensions::new(128, 256, 128), 1.0);
        let camera = CameraState::framing(&bounds, 1.0);
        let view_proj = camera.view_projection();

        for corner in [bounds.min, bounds.max, Vec3::new(bounds.min.x, bounds.max.y, bounds.min.z)] {
            let clip = view_proj * corner.extend(1.0);
            let ndc = clip.truncate() / clip.w;
            assert!(clip.w > 0.0, "corner {corner} behind the camera");
            assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0, "corner {corner} outside the frame: {ndc}");
        }
    }

    #[test]
    fn test_world_is_inverse_view() {
        let camera = CameraState::default();
        let product = camera.world * camera.view();
        assert!(product.abs_diff_eq(Mat4::IDENTITY, 1e-5));
        assert!(camera.world.transform_point3(Vec3::ZERO).abs_diff_eq(camera.position, 1e-4));
    }
}
