//! Human model types

use super::body::Rotation;

/// One joint of a human model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Joint {
    pub id: u32,
    /// Tracking quality, negative if not tracked
    pub quality: f64,
    /// Location (mm)
    pub loc: [f64; 3],
    pub rot: Rotation,
    /// Euler angles (deg), transmitted only when enabled in the controller
    pub angles: Option<[f64; 3]>,
}

impl Joint {
    pub fn is_tracked(&self) -> bool {
        self.quality >= 0.0
    }
}

/// Human model: a sequence of tracked joints
#[derive(Debug, Clone, PartialEq)]
pub struct HumanModel {
    pub id: u32,
    pub joints: Vec<Joint>,
}

impl HumanModel {
    pub fn num_joints(&self) -> usize {
        self.joints.len()
    }

    /// Joint lookup by joint id (ids inside a model may be sparse)
    pub fn joint(&self, id: u32) -> Option<&Joint> {
        self.joints.iter().find(|j| j.id == id)
    }
}
