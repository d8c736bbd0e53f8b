use image::{Rgba, RgbaImage};

pub const SPRITE_SIZE: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Fraction of the gradient radius, 0 at the centre and 1 at the edge.
    pub offset: f32,
    pub rgba: [f32; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    stops: Vec<GradientStop>,
}

impl RadialGradient {
    pub fn new(mut stops: Vec<GradientStop>) -> Self {
        for stop in &mut stops {
            stop.offset = stop.offset.clamp(0.0, 1.0);
        }
        stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        Self { stops }
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    pub fn sample(&self, t: f32) -> [f32; 4] {
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return [0.0; 4],
        };
        if t <= first.offset {
            return first.rgba;
        }
        if t >= last.offset {
            return last.rgba;
        }

        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.offset {
                let span = b.offset - a.offset;
                let local = if span <= f32::EPSILON {
                    1.0
                } else {
                    (t - a.offset) / span
                };
                return lerp4(a.rgba, b.rgba, local);
            }
        }
        last.rgba
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpriteSpec {
    pub size: u32,
    pub gradient: RadialGradient,
}

impl SpriteSpec {
    pub fn soft_circle() -> Self {
        Self {
            size: SPRITE_SIZE,
            gradient: RadialGradient::new(vec![
                GradientStop {
                    offset: 0.0,
                    rgba: [1.0, 1.0, 1.0, 1.0],
                },
                GradientStop {
                    offset: 0.2,
                    rgba: [1.0, 1.0, 1.0, 0.8],
                },
                GradientStop {
                    offset: 1.0,
                    rgba: [1.0, 1.0, 1.0, 0.0],
                },
            ]),
        }
    }
}

/// Square RGBA8 raster with straight alpha.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteTexture {
    image: RgbaImage,
}

impl SpriteTexture {
    pub fn from_image(image: RgbaImage) -> Option<Self> {
        if image.width() != image.height() {
            return None;
        }
        Some(Self { image })
    }

    pub fn size(&self) -> u32 {
        self.image.width()
    }

    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn rgba_at(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.image.get_pixel_checked(x, y).map(|px| px.0)
    }

    pub fn alpha_at(&self, x: u32, y: u32) -> Option<u8> {
        self.rgba_at(x, y).map(|px| px[3])
    }

    pub fn center(&self) -> (u32, u32) {
        (self.size() / 2, self.size() / 2)
    }
}

pub trait Rasterizer {
    fn rasterize(&self, spec: &SpriteSpec) -> SpriteTexture;
}

/// Samples the gradient at integer lattice points measured from
/// `(size / 2, size / 2)`, with radius `size / 2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuRasterizer;

impl Rasterizer for CpuRasterizer {
    fn rasterize(&self, spec: &SpriteSpec) -> SpriteTexture {
        let half = spec.size as f32 * 0.5;
        let image = RgbaImage::from_fn(spec.size, spec.size, |x, y| {
            let dx = x as f32 - half;
            let dy = y as f32 - half;
            let t = if half > 0.0 {
                (dx * dx + dy * dy).sqrt() / half
            } else {
                1.0
            };
            let [r, g, b, a] = spec.gradient.sample(t);
            Rgba([to_byte(r), to_byte(g), to_byte(b), to_byte(a)])
        });
        SpriteTexture { image }
    }
}

pub fn generate() -> SpriteTexture {
    generate_with(&CpuRasterizer)
}

pub fn generate_with<R: Rasterizer + ?Sized>(rasterizer: &R) -> SpriteTexture {
    rasterizer.rasterize(&SpriteSpec::soft_circle())
}

fn to_byte(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn lerp4(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    let t = t.clamp(0.0, 1.0);
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}
