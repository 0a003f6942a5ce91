// tests/pipeline_integration_test.rs
//
// End to end run of the correction factor pipeline on a synthetic sqlite bag.

use std::path::{Path, PathBuf};

use approx::assert_abs_diff_eq;
use rusqlite::{params, Connection};

use thrust_map_analysis::config::CorrectionFactorConfig;
use thrust_map_analysis::constants::{
    COL_ERR_THROTTLE_VS_VOLTAGE, COL_ERR_THRUST_PERCENT, COL_ERR_VOLTAGE, COL_THROTTLE,
    COL_THRUST_MEASURED, COL_VOLTAGE, ERROR_CSV_COLUMNS, FLIGHT_CSV_COLUMNS,
};
use thrust_map_analysis::data_input::csv_results::read_csv;
use thrust_map_analysis::data_input::log_data::LogData;
use thrust_map_analysis::data_input::messages::{
    BatteryState, Header, Imu, PlatformInfo, PoseStamped, Thrust, UInt16MultiArrayStamped,
    Vector3,
};
use thrust_map_analysis::processing::pipeline::{get_results, process_rosbag, ResultsMode};

const ACC_Z: f64 = 10.0;
const THRUST_COMMANDED: f64 = 11.0;

fn create_bag(path: &Path, voltage: f32) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE topics (id INTEGER PRIMARY KEY, name TEXT NOT NULL, type TEXT NOT NULL,
                              serialization_format TEXT NOT NULL, offered_qos_profiles TEXT NOT NULL);
         CREATE TABLE messages (id INTEGER PRIMARY KEY, topic_id INTEGER NOT NULL,
                                timestamp INTEGER NOT NULL, data BLOB NOT NULL);",
    )
    .unwrap();

    let topics = [
        (1, "/drone0/actuator_command/thrust", "as2_msgs/msg/Thrust"),
        (2, "/drone0/sensor_measurements/imu", "sensor_msgs/msg/Imu"),
        (3, "/drone0/sensor_measurements/battery", "sensor_msgs/msg/BatteryState"),
        (4, "/drone0/platform/info", "as2_msgs/msg/PlatformInfo"),
        (5, "/drone0/debug/rc/command", "as2_msgs/msg/UInt16MultiArrayStamped"),
        (6, "/drone0/self_localization/pose", "geometry_msgs/msg/PoseStamped"),
        (7, "/drone0/rosout", "rcl_interfaces/msg/Log"),
    ];
    for (id, name, type_name) in topics {
        conn.execute(
            "INSERT INTO topics (id, name, type, serialization_format, offered_qos_profiles)
             VALUES (?1, ?2, ?3, 'cdr', '')",
            params![id, name, type_name],
        )
        .unwrap();
    }

    let insert = |topic_id: i64, t: f64, data: Vec<u8>| {
        conn.execute(
            "INSERT INTO messages (topic_id, timestamp, data) VALUES (?1, ?2, ?3)",
            params![topic_id, (t * 1e9) as i64, data],
        )
        .unwrap();
    };

    for i in 0..100 {
        let t = 100.0 + i as f64 * 0.1;
        let header = Header::at(t);
        let flying = (101.0..108.0).contains(&t);
        insert(
            1,
            t,
            Thrust { header: header.clone(), thrust: THRUST_COMMANDED as f32, thrust_normalized: 0.4 }.encode(),
        );
        insert(
            2,
            t,
            Imu {
                header: header.clone(),
                linear_acceleration: Vector3 { x: 0.0, y: 0.0, z: ACC_Z },
                ..Default::default()
            }
            .encode(),
        );
        insert(
            3,
            t,
            BatteryState { header: header.clone(), voltage, ..Default::default() }.encode(),
        );
        insert(
            4,
            t,
            PlatformInfo {
                header: header.clone(),
                connected: true,
                armed: true,
                offboard: true,
                state: if flying { 3 } else { 2 },
            }
            .encode(),
        );
        insert(
            5,
            t,
            UInt16MultiArrayStamped { header: header.clone(), data: vec![1500, 1500, 1250, 1500] }
                .encode(),
        );
        insert(
            6,
            t,
            PoseStamped {
                header,
                position: Vector3 { x: 0.0, y: 0.0, z: 3.0 },
                orientation: [0.0, 0.0, 0.0, 1.0],
            }
            .encode(),
        );
    }
}

fn config(data_dir: &Path, bags: &[(&str, PathBuf)], extra: &str) -> CorrectionFactorConfig {
    let rosbags: String = if bags.is_empty() {
        "rosbags: {}\n".to_string()
    } else {
        bags.iter()
            .map(|(name, path)| format!("  {name}: {}\n", path.display()))
            .fold("rosbags:\n".to_string(), |acc, line| acc + &line)
    };
    let yaml = format!(
        "{rosbags}folder_experiment: hover\nmass: 1.0\n\
         tm_parameters: {{a: 1000.0, b: 100.0, c: 0.0, d: 0.0, e: 0.0, f: 0.0}}\n\
         data_dir: {}\nplot_dir: {}\n{extra}",
        data_dir.display(),
        data_dir.join("plots").display()
    );
    serde_yaml::from_str(&yaml).unwrap()
}

#[test]
fn test_bag_is_decoded_by_topic() {
    let dir = tempfile::tempdir().unwrap();
    let bag = dir.path().join("flight_0.db3");
    create_bag(&bag, 16.0);

    // Directory form of the bag path.
    let log = LogData::from_bag(dir.path()).unwrap();
    assert_eq!(log.thrust.len(), 100);
    assert_eq!(log.imu.len(), 100);
    assert_eq!(log.rc_command[0].data[2], 1250);
    assert!(log.controller_reference.is_empty());
    assert_eq!(log.imu[5].linear_acceleration.z, ACC_Z);
}

#[test]
fn test_pipeline_linear_approximation() {
    let dir = tempfile::tempdir().unwrap();
    let bags_dir = dir.path().join("bags");
    std::fs::create_dir_all(&bags_dir).unwrap();
    let bag_a = bags_dir.join("a.db3");
    let bag_b = bags_dir.join("b.db3");
    create_bag(&bag_a, 16.0);
    create_bag(&bag_b, 15.0);

    let data_dir = dir.path().join("data");
    let cfg = config(
        &data_dir,
        &[("flight_a", bag_a.clone()), ("flight_b", bag_b.clone())],
        "t_max: 40.0\n",
    );

    let mut flight_rows = 0;
    for (name, path) in &cfg.rosbags {
        let (flight, csv) = process_rosbag(name, path, &cfg).unwrap();
        assert_eq!(csv, data_dir.join("hover").join(format!("{name}.csv")));
        let table = read_csv(&csv).unwrap();
        assert_eq!(table.column_names(), FLIGHT_CSV_COLUMNS.to_vec());
        for v in table.values(COL_THRUST_MEASURED).unwrap() {
            assert_abs_diff_eq!(v, ACC_Z, epsilon = 1e-9);
        }
        for v in table.values(COL_THROTTLE).unwrap() {
            assert_eq!(v, 1250.0);
        }
        assert_eq!(table.row_count(), flight.position.len());
        flight_rows += table.row_count();
    }

    let results = get_results(&cfg).unwrap();
    assert_eq!(results.mode, ResultsMode::Linear);
    assert_eq!(results.rows, flight_rows);
    assert_eq!(results.unified_csv, data_dir.join("results").join("hover.csv"));
    assert!(results.correction_factor.is_none());

    let unified = read_csv(&results.unified_csv).unwrap();
    assert_eq!(unified.row_count(), flight_rows);
    let voltages = unified.values(COL_VOLTAGE).unwrap();
    assert!(voltages.contains(&16.0) && voltages.contains(&15.0));

    assert_eq!(results.errors_csv, data_dir.join("errors").join("hover_errors.csv"));
    let errors = read_csv(&results.errors_csv).unwrap();
    assert_eq!(errors.column_names(), ERROR_CSV_COLUMNS.to_vec());
    // Predicted 10/40·1000+1000 = 1250 µs, the recorded throttle.
    for e in errors.values(COL_ERR_THROTTLE_VS_VOLTAGE).unwrap() {
        assert_abs_diff_eq!(e, 0.0, epsilon = 1e-9);
    }
}

#[test]
fn test_pipeline_thrust_map_with_configured_correction_factor() {
    let dir = tempfile::tempdir().unwrap();
    let bag = dir.path().join("flight.db3");
    create_bag(&bag, 16.0);

    let data_dir = dir.path().join("data");
    let cfg = config(
        &data_dir,
        &[("flight", bag.clone())],
        "cf_parameters: {a2: 1.0, a1: 0.0, a0: 0.0}\n",
    );
    process_rosbag("flight", &bag, &cfg).unwrap();

    let results = get_results(&cfg).unwrap();
    assert_eq!(results.mode, ResultsMode::ThrustMapWithCorrectionFactor);
    let errors = read_csv(&results.errors_csv).unwrap();
    // 1000 + 100·(10/4) = 1250 µs.
    for e in errors.values(COL_ERR_THROTTLE_VS_VOLTAGE).unwrap() {
        assert_abs_diff_eq!(e, 0.0, epsilon = 1e-9);
    }
}

#[test]
fn test_pipeline_fits_correction_factor_when_none_configured() {
    let dir = tempfile::tempdir().unwrap();
    let bags_dir = dir.path().join("bags");
    std::fs::create_dir_all(&bags_dir).unwrap();
    let mut bags = Vec::new();
    for voltage in [14.0f32, 15.0, 16.0] {
        let bag = bags_dir.join(format!("v{voltage}.db3"));
        create_bag(&bag, voltage);
        bags.push((format!("flight_{voltage}"), bag));
    }

    let data_dir = dir.path().join("data");
    let named: Vec<(&str, PathBuf)> = bags.iter().map(|(n, p)| (n.as_str(), p.clone())).collect();
    let cfg = config(&data_dir, &named, "");
    for (name, path) in &cfg.rosbags {
        process_rosbag(name, path, &cfg).unwrap();
    }

    let results = get_results(&cfg).unwrap();
    assert_eq!(results.mode, ResultsMode::ThrustMapWithoutCorrectionFactor);

    // γ = commanded / measured = 11 / 10 at every voltage.
    let gamma = results.correction_factor.expect("fitted correction factor");
    let coefficients = gamma.coefficients();
    assert_eq!(coefficients.len(), 3);
    assert_abs_diff_eq!(coefficients[0], THRUST_COMMANDED / ACC_Z, epsilon = 1e-6);
    assert_abs_diff_eq!(coefficients[1], 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(coefficients[2], 0.0, epsilon = 1e-6);
    for voltage in [14.0, 15.0, 16.0] {
        assert_abs_diff_eq!(gamma.evaluate(voltage), 1.1, epsilon = 1e-9);
    }

    let errors = read_csv(&results.errors_csv).unwrap();
    assert_eq!(errors.column_names(), ERROR_CSV_COLUMNS.to_vec());
    assert_eq!(errors.row_count(), results.rows);
    let voltages = errors.values(COL_ERR_VOLTAGE).unwrap();
    for voltage in [14.0, 15.0, 16.0] {
        assert!(voltages.contains(&voltage));
    }
    // Uncorrected thrust map: 1000 + 100·(10/4) = 1250 µs, the recorded throttle.
    for e in errors.values(COL_ERR_THROTTLE_VS_VOLTAGE).unwrap() {
        assert_abs_diff_eq!(e, 0.0, epsilon = 1e-9);
    }
    // |11 − 10| / 10
    for e in errors.values(COL_ERR_THRUST_PERCENT).unwrap() {
        assert_abs_diff_eq!(e, 0.1, epsilon = 1e-6);
    }
}

#[test]
fn test_missing_bag_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), &[], "");
    assert!(process_rosbag("ghost", &dir.path().join("ghost.db3"), &cfg).is_err());
}
