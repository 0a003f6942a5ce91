// src/data_input/log_data.rs

use std::path::PathBuf;

use crate::data_input::messages::{
    BatteryState, Imu, PlatformInfo, PoseStamped, Thrust, UInt16MultiArrayStamped, Vector3Stamped,
};

/// Typed message buffers read from one flight log.
/// Topics absent from the log leave their buffer empty.
#[derive(Debug, Default, Clone)]
pub struct LogData {
    pub filename: PathBuf,
    pub thrust: Vec<Thrust>,                           // Thrust commanded to the actuators.
    pub imu: Vec<Imu>,                                 // IMU samples (acceleration z is used).
    pub battery: Vec<BatteryState>,                    // Battery voltage.
    pub controller_reference: Vec<Vector3Stamped>,     // Controller debug reference.
    pub controller_state: Vec<Vector3Stamped>,         // Controller debug state.
    pub platform_info: Vec<PlatformInfo>,              // Platform status (FLYING window).
    pub rc_command: Vec<UInt16MultiArrayStamped>,      // RC channels, throttle on channel 2.
    pub position: Vec<PoseStamped>,                    // Self-localization pose.
}

impl LogData {
    pub fn new(filename: PathBuf) -> Self {
        Self {
            filename,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.thrust.is_empty()
            && self.imu.is_empty()
            && self.battery.is_empty()
            && self.controller_reference.is_empty()
            && self.controller_state.is_empty()
            && self.platform_info.is_empty()
            && self.rc_command.is_empty()
            && self.position.is_empty()
    }
}

// src/data_input/log_data.rs
