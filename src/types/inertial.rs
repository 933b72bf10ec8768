//! Hybrid (optical-inertial) body types

use super::body::Rotation;

/// Tracking state of a hybrid body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingState {
    /// Neither optical nor inertial data available
    NotTracked = 0,
    /// Pose integrated from inertial data only
    InertialOnly = 1,
    /// Optical and inertial fused, drift correction pending
    HybridDrift = 2,
    /// Optical and inertial fused, fully corrected
    HybridCorrected = 3,
}

impl TrackingState {
    /// Map the wire value. Unknown values degrade to `NotTracked` so that
    /// newer controllers don't break the frame.
    pub fn from_wire(value: i64) -> Self {
        match value {
            1 => TrackingState::InertialOnly,
            2 => TrackingState::HybridDrift,
            3 => TrackingState::HybridCorrected,
            0 => TrackingState::NotTracked,
            other => {
                log::debug!("unknown hybrid body state {}, treating as not tracked", other);
                TrackingState::NotTracked
            }
        }
    }
}

/// Hybrid body: 6DOF pose from fused optical and inertial measurement
///
/// Ids may be sparse, like single markers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InertialBody {
    pub id: u32,
    pub state: TrackingState,
    /// Drift error estimate (deg)
    pub error: f64,
    /// Location (mm)
    pub loc: [f64; 3],
    pub rot: Rotation,
}

impl InertialBody {
    pub fn is_tracked(&self) -> bool {
        self.state != TrackingState::NotTracked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_wire() {
        assert_eq!(TrackingState::from_wire(0), TrackingState::NotTracked);
        assert_eq!(TrackingState::from_wire(1), TrackingState::InertialOnly);
        assert_eq!(TrackingState::from_wire(2), TrackingState::HybridDrift);
        assert_eq!(TrackingState::from_wire(3), TrackingState::HybridCorrected);
        // forward compatibility: unknown states do not panic
        assert_eq!(TrackingState::from_wire(9), TrackingState::NotTracked);
    }
}
