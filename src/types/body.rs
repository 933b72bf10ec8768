//! 6DOF body types: standard bodies, Flysticks, measurement tools

/// 3x3 rotation matrix, column-major, exactly as transmitted by the
/// controller. Not renormalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation(pub [f64; 9]);

impl Rotation {
    /// Identity matrix, used for untracked entities
    pub const IDENTITY: Rotation = Rotation([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);

    /// Matrix element at (row, col), both 0-based
    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.0[row + 3 * col]
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Standard 6DOF body pose
///
/// Also used for measurement reference bodies, which carry the same fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    /// Body id, 0-based
    pub id: u32,
    /// Tracking quality, negative if not tracked
    pub quality: f64,
    /// Location (mm)
    pub loc: [f64; 3],
    /// Orientation
    pub rot: Rotation,
}

impl Body {
    pub fn new(id: u32, quality: f64, loc: [f64; 3], rot: Rotation) -> Self {
        Self {
            id,
            quality,
            loc,
            rot,
        }
    }

    /// Create body marked as not tracked, with zeroed location and
    /// identity rotation
    pub fn untracked(id: u32) -> Self {
        Self {
            id,
            quality: -1.0,
            loc: [0.0, 0.0, 0.0],
            rot: Rotation::IDENTITY,
        }
    }

    /// A body is tracked iff its quality is non-negative
    pub fn is_tracked(&self) -> bool {
        self.quality >= 0.0
    }
}

/// Measurement reference bodies share the plain body layout.
pub type MeasurementReference = Body;

/// Flystick: 6DOF body with buttons and joystick axes
#[derive(Debug, Clone, PartialEq)]
pub struct Flystick {
    pub id: u32,
    pub quality: f64,
    pub loc: [f64; 3],
    pub rot: Rotation,
    /// Button states, index 0 is the trigger on current hardware
    pub buttons: Vec<bool>,
    /// Joystick axes in [-1.0, 1.0]
    pub joysticks: Vec<f64>,
}

impl Flystick {
    pub fn is_tracked(&self) -> bool {
        self.quality >= 0.0
    }

    /// Button state, `false` for out-of-range ids
    pub fn button(&self, id: usize) -> bool {
        self.buttons.get(id).copied().unwrap_or(false)
    }

    /// Joystick axis value, `0.0` for out-of-range ids
    pub fn joystick(&self, id: usize) -> f64 {
        self.joysticks.get(id).copied().unwrap_or(0.0)
    }
}

/// Measurement tool: 6DOF body with buttons and an optional tip radius
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementTool {
    pub id: u32,
    pub quality: f64,
    pub loc: [f64; 3],
    pub rot: Rotation,
    /// Tip radius (mm), reported only by newer tool records
    pub tip_radius: Option<f64>,
    pub buttons: Vec<bool>,
}

impl MeasurementTool {
    pub fn is_tracked(&self) -> bool {
        self.quality >= 0.0
    }

    pub fn button(&self, id: usize) -> bool {
        self.buttons.get(id).copied().unwrap_or(false)
    }
}
