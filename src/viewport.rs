use glam::{Mat4, Vec3};

/// Upper bound on render-target pixels per logical pixel.
pub const MAX_PIXEL_DENSITY: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub eye: Vec3,
    pub aspect: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            eye: Vec3::new(0.0, 0.0, 10.0),
            aspect: 1.0,
        }
    }
}

impl PerspectiveCamera {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, Vec3::ZERO, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Logical viewport size, pixel density and the camera that looks into it.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    width: u32,
    height: u32,
    device_pixel_ratio: f32,
    max_pixel_density: f32,
    pixel_density: f32,
    camera: PerspectiveCamera,
}

impl Viewport {
    pub fn new(width: u32, height: u32, device_pixel_ratio: f32) -> Self {
        let mut viewport = Self {
            width: 1,
            height: 1,
            device_pixel_ratio: 1.0,
            max_pixel_density: MAX_PIXEL_DENSITY,
            pixel_density: 1.0,
            camera: PerspectiveCamera::default(),
        };
        viewport.resize(width, height, device_pixel_ratio);
        viewport
    }

    pub fn with_max_pixel_density(mut self, cap: f32) -> Self {
        self.max_pixel_density = cap.max(f32::MIN_POSITIVE);
        self.resize(self.width, self.height, self.device_pixel_ratio);
        self
    }

    /// Recomputes aspect ratio, pixel density and render-target size.
    /// Zero dimensions are treated as 1 so the aspect stays finite.
    pub fn resize(&mut self, width: u32, height: u32, device_pixel_ratio: f32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.device_pixel_ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        self.pixel_density = self.device_pixel_ratio.min(self.max_pixel_density);
        self.camera.aspect = self.width as f32 / self.height as f32;
        log::debug!(
            "viewport resized to {}x{} @ {:.2}x (target {:?})",
            self.width,
            self.height,
            self.pixel_density,
            self.render_target_size()
        );
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect(&self) -> f32 {
        self.camera.aspect
    }

    pub fn pixel_density(&self) -> f32 {
        self.pixel_density
    }

    pub fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn view_projection(&self) -> Mat4 {
        self.camera.view_projection()
    }

    /// Physical size of the render target, at least 1x1.
    pub fn render_target_size(&self) -> (u32, u32) {
        let scale = |v: u32| ((v as f32 * self.pixel_density).round() as u32).max(1);
        (scale(self.width), scale(self.height))
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::Viewport;

    #[test]
    fn resize_is_idempotent() {
        let mut viewport = Viewport::new(1280, 720, 1.5);
        viewport.resize(1024, 768, 3.0);
        let first = viewport.clone();
        viewport.resize(1024, 768, 3.0);
        assert_eq!(viewport, first);
        assert_eq!(viewport.aspect(), 1024.0 / 768.0);
        assert_eq!(viewport.pixel_density(), 2.0);
    }

    #[test]
    fn pixel_density_is_capped_at_two() {
        let viewport = Viewport::new(100, 100, 3.0);
        assert_eq!(viewport.pixel_density(), 2.0);
        assert_eq!(viewport.render_target_size(), (200, 200));

        let viewport = Viewport::new(100, 50, 1.25);
        assert_eq!(viewport.pixel_density(), 1.25);
        assert_eq!(viewport.render_target_size(), (125, 63));
    }

    #[test]
    fn custom_cap_applies() {
        let viewport = Viewport::new(800, 600, 2.0).with_max_pixel_density(1.0);
        assert_eq!(viewport.pixel_density(), 1.0);
        assert_eq!(viewport.render_target_size(), (800, 600));
    }

    #[test]
    fn zero_height_does_not_produce_infinite_aspect() {
        let viewport = Viewport::new(640, 0, 1.0);
        assert_eq!(viewport.height(), 1);
        assert!(viewport.aspect().is_finite());
    }

    #[test]
    fn origin_projects_to_screen_centre() {
        let viewport = Viewport::new(800, 600, 1.0);
        let clip = viewport.view_projection() * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!((0.0..=1.0).contains(&ndc.z));
    }
}
