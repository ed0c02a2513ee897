use pulse_forwarder::app::{Config, ConfigError};
use pulse_forwarder::transport::SendPolicy;
use std::time::Duration;

#[test]
fn defaults_are_sensible() {
    let config = Config::from_args(["pulse-forwarder"]).unwrap();

    assert_eq!(config.collector_host, "localhost");
    assert_eq!(config.collector_port, 9600);
    assert_eq!(config.send_policy, SendPolicy::WaitWritable);
    assert_eq!(config.sensors, 1);
    assert_eq!(config.backoff_base, Duration::from_secs(1));
    assert_eq!(config.backoff_ceiling, Duration::from_secs(60));
}

#[test]
fn cli_arguments_override_defaults() {
    let config = Config::from_args([
        "pulse-forwarder",
        "--collector-host",
        "collector.example.com",
        "--collector-port",
        "8080",
        "--send-policy",
        "reconnect-on-block",
        "--sensors",
        "4",
        "--backoff-base-ms",
        "250",
        "--backoff-ceiling-ms",
        "120000",
    ])
    .unwrap();

    assert_eq!(config.collector_host, "collector.example.com");
    assert_eq!(config.collector_port, 8080);
    assert_eq!(config.send_policy, SendPolicy::ReconnectOnBlock);
    assert_eq!(config.sensors, 4);
    assert_eq!(config.backoff_base, Duration::from_millis(250));
    assert_eq!(config.backoff_ceiling, Duration::from_secs(120));
}

#[test]
fn zero_backoff_base_is_rejected() {
    let result = Config::from_args(["pulse-forwarder", "--backoff-base-ms", "0"]);
    assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
}

#[test]
fn ceiling_below_base_is_rejected() {
    let result = Config::from_args([
        "pulse-forwarder",
        "--backoff-base-ms",
        "5000",
        "--backoff-ceiling-ms",
        "1000",
    ]);
    assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
}

#[test]
fn zero_sensors_is_rejected() {
    let result = Config::from_args(["pulse-forwarder", "--sensors", "0"]);
    assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
}

#[test]
fn config_file_round_trips_through_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
collector_host = "collector.internal"
collector_port = 9700
spool_path = "/var/spool/pulse/forwarder.bin"
send_policy = "reconnect-on-block"
backoff_base_ms = 500
sensors = 2
"#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.collector_host, "collector.internal");
    assert_eq!(config.collector_port, 9700);
    assert_eq!(config.send_policy, SendPolicy::ReconnectOnBlock);
    assert_eq!(config.backoff_base, Duration::from_millis(500));
    assert_eq!(config.sensors, 2);
    // Unspecified fields keep their defaults.
    assert_eq!(config.backoff_ceiling, Duration::from_secs(60));
}

#[test]
fn invalid_toml_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "collector_port = \"not a number\"").unwrap();

    assert!(matches!(Config::from_file(&path), Err(ConfigError::Toml(_))));
}
