use dslstat::config::{AppConfig, InfluxConfig, ModemConfig};

pub fn config_for(modem_uri: String, influx_uri: String) -> AppConfig {
    AppConfig {
        log_level: "info".into(),
        poll_interval_seconds: 60,
        modem: ModemConfig {
            uri: modem_uri,
            username: "admin".into(),
            password: "hunter2".into(),
        },
        influx: InfluxConfig {
            uri: influx_uri,
            token: "tok3n".into(),
            bucket: "bucket1".into(),
            org: "org1".into(),
            location: "siteA".into(),
        },
    }
}

/// Status page captured from a PK5001Z, trimmed of trailing newline.
pub fn status_page() -> String {
    std::fs::read_to_string("tests/fixtures/GetDSLInfo.txt")
        .expect("read status fixture")
        .trim_end()
        .to_string()
}
