//! System status types

/// Per-camera status, part of the system status record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraStatus {
    /// Camera id, 0-based
    pub id: u32,
    /// Number of 2DOF reflections seen by this camera
    pub num_reflections: u32,
    /// Number of seen reflections used for 6DOF tracking
    pub num_reflections_used: u32,
    /// Intensity of the brightest pixel (0..10)
    pub max_intensity: u32,
}

/// Message counters accumulated by the controller since booting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageCounters {
    pub camera_errors: u32,
    pub camera_warnings: u32,
    pub other_errors: u32,
    pub other_warnings: u32,
    pub infos: u32,
}

/// System status as reported in the measurement stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemStatus {
    pub num_cameras: u32,
    /// Number of currently tracked 6DOF bodies
    pub num_tracked_bodies: u32,
    /// Number of currently found additional 3DOF markers
    pub num_tracked_markers: u32,
    pub counters: MessageCounters,
    pub cameras: Vec<CameraStatus>,
}

impl SystemStatus {
    /// Status of one camera by camera id
    pub fn camera(&self, id: u32) -> Option<&CameraStatus> {
        self.cameras.iter().find(|c| c.id == id)
    }
}
