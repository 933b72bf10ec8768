//! Measurement frame: one parsed datagram

use super::body::{Body, Flystick, MeasurementReference, MeasurementTool};
use super::hand::Hand;
use super::human::HumanModel;
use super::inertial::InertialBody;
use super::marker::Marker;
use super::status::SystemStatus;

/// Extended timestamp with microsecond resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampExt {
    /// Seconds since the epoch the controller is configured for
    pub sec: u64,
    /// Microsecond fraction
    pub usec: u32,
}

/// One measurement frame, the immutable result of parsing one datagram.
///
/// A frame is created by the parser, published atomically by the session
/// and never mutated afterwards. Entities missing from the datagram leave
/// their sequence empty and their scalar `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    /// Frame counter as sent by the controller
    pub frame_counter: u32,
    /// Timestamp (s), `None` if the controller does not transmit it
    pub timestamp: Option<f64>,
    /// Extended timestamp, `None` if not transmitted
    pub timestamp_ext: Option<TimestampExt>,
    /// Latency between exposure and transmission (us), `None` if not transmitted
    pub latency_us: Option<u32>,

    /// Standard bodies in declared order, ids dense and 0-based
    pub bodies: Vec<Body>,
    pub flysticks: Vec<Flystick>,
    pub tools: Vec<MeasurementTool>,
    pub references: Vec<MeasurementReference>,
    pub hands: Vec<Hand>,
    /// Single markers, ids may be sparse
    pub markers: Vec<Marker>,
    pub humans: Vec<HumanModel>,
    /// Hybrid bodies, ids may be sparse
    pub inertial_bodies: Vec<InertialBody>,
    pub status: Option<SystemStatus>,
}

impl Frame {
    pub fn num_bodies(&self) -> usize {
        self.bodies.len()
    }

    pub fn num_flysticks(&self) -> usize {
        self.flysticks.len()
    }

    pub fn num_tools(&self) -> usize {
        self.tools.len()
    }

    pub fn num_references(&self) -> usize {
        self.references.len()
    }

    pub fn num_hands(&self) -> usize {
        self.hands.len()
    }

    pub fn num_markers(&self) -> usize {
        self.markers.len()
    }

    pub fn num_humans(&self) -> usize {
        self.humans.len()
    }

    pub fn num_inertial_bodies(&self) -> usize {
        self.inertial_bodies.len()
    }

    /// Body by position (equals body id for the dense body sequence)
    pub fn body(&self, id: usize) -> Option<&Body> {
        self.bodies.get(id)
    }

    pub fn flystick(&self, id: usize) -> Option<&Flystick> {
        self.flysticks.get(id)
    }

    pub fn tool(&self, id: usize) -> Option<&MeasurementTool> {
        self.tools.get(id)
    }

    pub fn hand(&self, id: usize) -> Option<&Hand> {
        self.hands.get(id)
    }

    /// Marker lookup by authoritative marker id
    pub fn marker(&self, id: u32) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }

    /// Hybrid body lookup by authoritative body id
    pub fn inertial_body(&self, id: u32) -> Option<&InertialBody> {
        self.inertial_bodies.iter().find(|b| b.id == id)
    }

    pub fn human(&self, id: u32) -> Option<&HumanModel> {
        self.humans.iter().find(|h| h.id == id)
    }
}
