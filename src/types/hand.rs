//! Fingertracking hand types

use super::body::Rotation;

/// Which hand a fingertracking record refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    /// Wire encoding: 0 = left, 1 = right. Anything else is treated as
    /// right, matching the controller's "not left" semantics.
    pub fn from_wire(value: i64) -> Self {
        if value == 0 {
            Handedness::Left
        } else {
            Handedness::Right
        }
    }
}

/// One finger of a tracked hand, order: thumb, index, middle, ...
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Finger {
    /// Fingertip location (mm)
    pub loc: [f64; 3],
    /// Fingertip orientation
    pub rot: Rotation,
    /// Fingertip radius (mm)
    pub tip_radius: f64,
    /// Lengths of the three phalanxes, outermost first (mm)
    pub phalanx_lengths: [f64; 3],
    /// Angles between consecutive phalanxes (deg)
    pub phalanx_angles: [f64; 2],
}

/// Fingertracking hand: back-of-hand pose plus per-finger geometry
#[derive(Debug, Clone, PartialEq)]
pub struct Hand {
    pub id: u32,
    /// Tracking quality, negative if not tracked
    pub quality: f64,
    pub handedness: Handedness,
    /// Back of the hand location (mm)
    pub loc: [f64; 3],
    pub rot: Rotation,
    pub fingers: Vec<Finger>,
}

impl Hand {
    pub fn is_tracked(&self) -> bool {
        self.quality >= 0.0
    }

    pub fn num_fingers(&self) -> usize {
        self.fingers.len()
    }
}
