// src/data_input/bag_reader.rs
//
// Reads ROS 2 bags stored with the sqlite3 plugin and dispatches the recorded
// messages by topic name into a `LogData`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};

use crate::data_input::log_data::LogData;
use crate::data_input::messages::{
    BatteryState, CdrMessage, Imu, PlatformInfo, PoseStamped, Thrust, UInt16MultiArrayStamped,
    Vector3Stamped,
};
use crate::error::{AnalysisError, Result};

const BAG_FILE_EXTENSION: &str = "db3";

/// Raw, still-serialized messages of one topic.
#[derive(Debug, Clone, Default)]
pub struct TopicMessages {
    pub type_name: String,
    /// `(receive timestamp ns, serialized payload)` in recording order.
    pub messages: Vec<(i64, Vec<u8>)>,
}

/// Resolves the storage files of a bag: every `.db3` in a bag directory (name
/// order), or the given `.db3` file itself.
pub fn bag_storage_files(path: &Path) -> Result<Vec<PathBuf>> {
    let is_db3 =
        |p: &Path| p.extension().and_then(|e| e.to_str()) == Some(BAG_FILE_EXTENSION);

    if path.is_dir() {
        let mut files: Vec<PathBuf> = fs::read_dir(path)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_db3(p))
            .collect();
        files.sort();
        if files.is_empty() {
            return Err(AnalysisError::NotABag(path.to_path_buf()));
        }
        Ok(files)
    } else if path.is_file() && is_db3(path) {
        Ok(vec![path.to_path_buf()])
    } else {
        Err(AnalysisError::NotABag(path.to_path_buf()))
    }
}

/// Reads every message of a bag grouped by topic name.
pub fn read_bag(path: &Path) -> Result<BTreeMap<String, TopicMessages>> {
    let mut topics: BTreeMap<String, TopicMessages> = BTreeMap::new();

    for storage_file in bag_storage_files(path)? {
        log::debug!("Reading bag storage '{}'", storage_file.display());
        let conn = Connection::open_with_flags(&storage_file, OpenFlags::SQLITE_OPEN_READ_ONLY)?;

        let mut topic_names: BTreeMap<i64, String> = BTreeMap::new();
        {
            let mut stmt = conn.prepare("SELECT id, name, type FROM topics")?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?;
            for row in rows {
                let (id, name, type_name) = row?;
                topics.entry(name.clone()).or_insert_with(|| TopicMessages {
                    type_name,
                    messages: Vec::new(),
                });
                topic_names.insert(id, name);
            }
        }

        let mut stmt =
            conn.prepare("SELECT topic_id, timestamp, data FROM messages ORDER BY timestamp")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, Vec<u8>>(2)?,
            ))
        })?;
        for row in rows {
            let (topic_id, timestamp, data) = row?;
            match topic_names.get(&topic_id).and_then(|name| topics.get_mut(name)) {
                Some(topic) => topic.messages.push((timestamp, data)),
                None => log::warn!("Message references unknown topic id {topic_id}, skipping"),
            }
        }
    }

    log::info!(
        "Read {} topics from '{}'",
        topics.len(),
        path.display()
    );
    Ok(topics)
}

/// Decodes all payloads of a topic as `M`, checking the declared type first.
pub fn deserialize_msgs<M: CdrMessage>(topic: &str, raw: &TopicMessages) -> Result<Vec<M>> {
    if raw.type_name != M::TYPE_NAME {
        return Err(AnalysisError::UnsupportedMessageType {
            topic: topic.to_string(),
            type_name: raw.type_name.clone(),
            expected: M::TYPE_NAME,
        });
    }
    raw.messages
        .iter()
        .map(|(_, payload)| M::from_bytes(payload))
        .collect()
}

impl LogData {
    /// Opens a bag and fills the typed buffers by topic name.
    pub fn from_bag(path: &Path) -> Result<Self> {
        let mut log_data = LogData::new(path.to_path_buf());
        let topics = read_bag(path)?;

        for (topic, raw) in &topics {
            if topic.contains("actuator_command/thrust") {
                log_data.thrust = deserialize_msgs::<Thrust>(topic, raw)?;
            } else if topic.contains("sensor_measurements/imu") {
                log_data.imu = deserialize_msgs::<Imu>(topic, raw)?;
            } else if topic.contains("sensor_measurements/battery") {
                log_data.battery = deserialize_msgs::<BatteryState>(topic, raw)?;
            } else if topic.contains("debug/controller_reference") {
                log_data.controller_reference = deserialize_msgs::<Vector3Stamped>(topic, raw)?;
            } else if topic.contains("debug/controller_state") {
                log_data.controller_state = deserialize_msgs::<Vector3Stamped>(topic, raw)?;
            } else if topic.contains("debug/rc/command") {
                log_data.rc_command = deserialize_msgs::<UInt16MultiArrayStamped>(topic, raw)?;
            } else if topic.contains("platform/info") {
                log_data.platform_info = deserialize_msgs::<PlatformInfo>(topic, raw)?;
            } else if topic.contains("self_localization/pose") {
                log_data.position = deserialize_msgs::<PoseStamped>(topic, raw)?;
            } else {
                log::debug!("Ignoring topic '{topic}' ({})", raw.type_name);
            }
        }

        log::info!(
            "Decoded log '{}': {} thrust, {} imu, {} battery, {} status, {} rc, {} pose messages",
            path.display(),
            log_data.thrust.len(),
            log_data.imu.len(),
            log_data.battery.len(),
            log_data.platform_info.len(),
            log_data.rc_command.len(),
            log_data.position.len(),
        );
        Ok(log_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_a_bag() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            bag_storage_files(dir.path()),
            Err(AnalysisError::NotABag(_))
        ));
        let txt = dir.path().join("notes.txt");
        fs::write(&txt, "hello").unwrap();
        assert!(matches!(
            bag_storage_files(&txt),
            Err(AnalysisError::NotABag(_))
        ));
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let raw = TopicMessages {
            type_name: "std_msgs/msg/String".to_string(),
            messages: vec![],
        };
        let err = deserialize_msgs::<Thrust>("/drone0/actuator_command/thrust", &raw).unwrap_err();
        assert!(matches!(err, AnalysisError::UnsupportedMessageType { .. }));
    }
}
