/// 2D point in whatever space produced it (local, document or machine)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Scale + translate transform.
///
/// Represents: | sx  0  tx |
///             |  0 sy  ty |
///             |  0  0   1 |
///
/// Shear and rotation are not modeled; `matrix(a, b, c, d, e, f)` inputs keep
/// only `a`, `d`, `e` and `f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub sx: f64,
    pub sy: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub const fn identity() -> Self {
        Self {
            sx: 1.0,
            sy: 1.0,
            tx: 0.0,
            ty: 0.0,
        }
    }

    pub const fn new(sx: f64, sy: f64, tx: f64, ty: f64) -> Self {
        Self { sx, sy, tx, ty }
    }

    /// Compose two transforms: self (parent) applied after `local`
    pub fn compose(&self, local: &Transform) -> Transform {
        Transform {
            sx: self.sx * local.sx,
            sy: self.sy * local.sy,
            tx: self.sx * local.tx + self.tx,
            ty: self.sy * local.ty + self.ty,
        }
    }

    /// Transform a point
    pub fn apply(&self, p: Point) -> Point {
        Point::new(p.x * self.sx + self.tx, p.y * self.sy + self.ty)
    }
}

/// Ordered polyline. Closed shapes repeat their first point at the end.
pub type GeometryPath = Vec<Point>;

/// Resolved display color of a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channel sum, the layer ordering key
    pub fn sum(&self) -> u32 {
        self.r as u32 + self.g as u32 + self.b as u32
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// One color group's geometry plus its machine parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ColorLayer {
    /// Stroke token exactly as it appeared in the document
    pub color_key: String,
    pub paths: Vec<GeometryPath>,
    /// Laser power in percent
    pub power: f64,
    /// Cutting speed in mm/s
    pub speed: f64,
    pub rgb: Rgb,
}

impl ColorLayer {
    /// Min/max power pair as consumed by the encoder
    pub fn power_range(&self) -> [f64; 2] {
        [self.power, self.power]
    }

    pub fn point_count(&self) -> usize {
        self.paths.iter().map(Vec::len).sum()
    }
}

/// Ordered, immutable list of layers ready for encoding.
///
/// Layers are sorted ascending by the channel sum of their color.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaserJob {
    layers: Vec<ColorLayer>,
}

impl LaserJob {
    pub(crate) fn from_layers(layers: Vec<ColorLayer>) -> Self {
        Self { layers }
    }

    pub fn layers(&self) -> &[ColorLayer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColorLayer> {
        self.layers.iter()
    }
}

impl<'a> IntoIterator for &'a LaserJob {
    type Item = &'a ColorLayer;
    type IntoIter = std::slice::Iter<'a, ColorLayer>;

    fn into_iter(self) -> Self::IntoIter {
        self.layers.iter()
    }
}
