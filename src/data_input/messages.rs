// src/data_input/messages.rs
//
// Typed views of the recorded messages. Only the leading fields needed by the
// analysis are decoded; trailing fields are left unread.

use crate::data_input::cdr::{CdrReader, CdrWriter};
use crate::error::Result;

/// A message type that can be decoded from a CDR payload.
pub trait CdrMessage: Sized {
    /// Fully qualified ROS 2 type name as stored in the bag's topic table.
    const TYPE_NAME: &'static str;

    fn decode(reader: &mut CdrReader<'_>) -> Result<Self>;

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut reader = CdrReader::new(data)?;
        Self::decode(&mut reader)
    }
}

/// `builtin_interfaces/msg/Time`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Time {
    pub sec: i32,
    pub nanosec: u32,
}

impl Time {
    pub fn from_secs_f64(t: f64) -> Self {
        let sec = t.floor();
        Self {
            sec: sec as i32,
            nanosec: ((t - sec) * 1e9).round() as u32,
        }
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.sec as f64 + self.nanosec as f64 * 1e-9
    }

    fn decode(r: &mut CdrReader<'_>) -> Result<Self> {
        Ok(Self {
            sec: r.read_i32()?,
            nanosec: r.read_u32()?,
        })
    }

    fn encode(&self, w: &mut CdrWriter) {
        w.write_i32(self.sec).write_u32(self.nanosec);
    }
}

/// `std_msgs/msg/Header`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    pub stamp: Time,
    pub frame_id: String,
}

impl Header {
    pub fn at(t: f64) -> Self {
        Self {
            stamp: Time::from_secs_f64(t),
            frame_id: String::new(),
        }
    }

    fn decode(r: &mut CdrReader<'_>) -> Result<Self> {
        Ok(Self {
            stamp: Time::decode(r)?,
            frame_id: r.read_string()?,
        })
    }

    fn encode(&self, w: &mut CdrWriter) {
        self.stamp.encode(w);
        w.write_string(&self.frame_id);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    fn decode(r: &mut CdrReader<'_>) -> Result<Self> {
        let [x, y, z] = r.read_f64_array::<3>()?;
        Ok(Self { x, y, z })
    }

    fn encode(&self, w: &mut CdrWriter) {
        w.write_f64(self.x).write_f64(self.y).write_f64(self.z);
    }
}

/// `as2_msgs/msg/Thrust`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Thrust {
    pub header: Header,
    pub thrust: f32,
    pub thrust_normalized: f32,
}

impl CdrMessage for Thrust {
    const TYPE_NAME: &'static str = "as2_msgs/msg/Thrust";

    fn decode(r: &mut CdrReader<'_>) -> Result<Self> {
        Ok(Self {
            header: Header::decode(r)?,
            thrust: r.read_f32()?,
            thrust_normalized: r.read_f32()?,
        })
    }
}

/// `sensor_msgs/msg/Imu`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Imu {
    pub header: Header,
    pub orientation: [f64; 4],
    pub angular_velocity: Vector3,
    pub linear_acceleration: Vector3,
}

impl CdrMessage for Imu {
    const TYPE_NAME: &'static str = "sensor_msgs/msg/Imu";

    fn decode(r: &mut CdrReader<'_>) -> Result<Self> {
        let header = Header::decode(r)?;
        let orientation = r.read_f64_array::<4>()?;
        r.read_f64_array::<9>()?;
        let angular_velocity = Vector3::decode(r)?;
        r.read_f64_array::<9>()?;
        let linear_acceleration = Vector3::decode(r)?;
        Ok(Self {
            header,
            orientation,
            angular_velocity,
            linear_acceleration,
        })
    }
}

/// `sensor_msgs/msg/BatteryState`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatteryState {
    pub header: Header,
    pub voltage: f32,
    pub temperature: f32,
    pub current: f32,
}

impl CdrMessage for BatteryState {
    const TYPE_NAME: &'static str = "sensor_msgs/msg/BatteryState";

    fn decode(r: &mut CdrReader<'_>) -> Result<Self> {
        Ok(Self {
            header: Header::decode(r)?,
            voltage: r.read_f32()?,
            temperature: r.read_f32()?,
            current: r.read_f32()?,
        })
    }
}

/// `as2_msgs/msg/PlatformInfo`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlatformInfo {
    pub header: Header,
    pub connected: bool,
    pub armed: bool,
    pub offboard: bool,
    /// `as2_msgs/msg/PlatformStatus.state` (3 = FLYING).
    pub state: i8,
}

impl CdrMessage for PlatformInfo {
    const TYPE_NAME: &'static str = "as2_msgs/msg/PlatformInfo";

    fn decode(r: &mut CdrReader<'_>) -> Result<Self> {
        Ok(Self {
            header: Header::decode(r)?,
            connected: r.read_bool()?,
            armed: r.read_bool()?,
            offboard: r.read_bool()?,
            state: r.read_i8()?,
        })
    }
}

/// `as2_msgs/msg/UInt16MultiArrayStamped`, used for the RC command channels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UInt16MultiArrayStamped {
    pub header: Header,
    pub data: Vec<u16>,
}

impl CdrMessage for UInt16MultiArrayStamped {
    const TYPE_NAME: &'static str = "as2_msgs/msg/UInt16MultiArrayStamped";

    fn decode(r: &mut CdrReader<'_>) -> Result<Self> {
        Ok(Self {
            header: Header::decode(r)?,
            data: r.read_u16_sequence()?,
        })
    }
}

/// `geometry_msgs/msg/PoseStamped`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseStamped {
    pub header: Header,
    pub position: Vector3,
    pub orientation: [f64; 4],
}

impl CdrMessage for PoseStamped {
    const TYPE_NAME: &'static str = "geometry_msgs/msg/PoseStamped";

    fn decode(r: &mut CdrReader<'_>) -> Result<Self> {
        Ok(Self {
            header: Header::decode(r)?,
            position: Vector3::decode(r)?,
            orientation: r.read_f64_array::<4>()?,
        })
    }
}

/// `geometry_msgs/msg/Vector3Stamped`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vector3Stamped {
    pub header: Header,
    pub vector: Vector3,
}

impl CdrMessage for Vector3Stamped {
    const TYPE_NAME: &'static str = "geometry_msgs/msg/Vector3Stamped";

    fn decode(r: &mut CdrReader<'_>) -> Result<Self> {
        Ok(Self {
            header: Header::decode(r)?,
            vector: Vector3::decode(r)?,
        })
    }
}

// Encoders for the same layouts, used to build bag fixtures.

impl Thrust {
    pub fn encode(&self) -> Vec<u8> {
        let mut w = CdrWriter::new();
        self.header.encode(&mut w);
        w.write_f32(self.thrust).write_f32(self.thrust_normalized);
        w.finish()
    }
}

impl Imu {
    pub fn encode(&self) -> Vec<u8> {
        let mut w = CdrWriter::new();
        self.header.encode(&mut w);
        for q in self.orientation {
            w.write_f64(q);
        }
        for _ in 0..9 {
            w.write_f64(0.0);
        }
        self.angular_velocity.encode(&mut w);
        for _ in 0..9 {
            w.write_f64(0.0);
        }
        self.linear_acceleration.encode(&mut w);
        for _ in 0..9 {
            w.write_f64(0.0);
        }
        w.finish()
    }
}

impl BatteryState {
    pub fn encode(&self) -> Vec<u8> {
        let mut w = CdrWriter::new();
        self.header.encode(&mut w);
        w.write_f32(self.voltage)
            .write_f32(self.temperature)
            .write_f32(self.current);
        w.finish()
    }
}

impl PlatformInfo {
    pub fn encode(&self) -> Vec<u8> {
        let mut w = CdrWriter::new();
        self.header.encode(&mut w);
        w.write_bool(self.connected)
            .write_bool(self.armed)
            .write_bool(self.offboard)
            .write_i8(self.state);
        w.finish()
    }
}

impl UInt16MultiArrayStamped {
    pub fn encode(&self) -> Vec<u8> {
        let mut w = CdrWriter::new();
        self.header.encode(&mut w);
        w.write_u16_sequence(&self.data);
        w.finish()
    }
}

impl PoseStamped {
    pub fn encode(&self) -> Vec<u8> {
        let mut w = CdrWriter::new();
        self.header.encode(&mut w);
        self.position.encode(&mut w);
        for q in self.orientation {
            w.write_f64(q);
        }
        w.finish()
    }
}

impl Vector3Stamped {
    pub fn encode(&self) -> Vec<u8> {
        let mut w = CdrWriter::new();
        self.header.encode(&mut w);
        self.vector.encode(&mut w);
        w.finish()
    }
}
