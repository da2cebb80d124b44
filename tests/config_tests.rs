// Tests for configuration loading.

use bikeguard_monitor::Config;
use std::io::Write;

fn write_config(dir: &tempfile::TempDir, contents: &str) -> String {
    let path = dir.path().join("bikeguard.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path.to_str().unwrap().trim_end_matches(".toml").to_string()
}

const FULL_CONFIG: &str = r#"
[service]
name = "bikeguard-monitor"

[service.http]
bind = "0.0.0.0"
port = 9090

[capture]
width = 1280
height = 720
fps = 15

[detection]
throttle_ms = 500
max_objects = 4
inference_url = "http://localhost:8765"

[classifier]
endpoint = "https://generativelanguage.googleapis.com/v1beta/models"
model = "gemini-1.5-flash"
api_key = "test-key"
debounce_ms = 900

[report]
endpoint = "https://api.emailjs.com/api/v1.0/email/send"
service_id = "svc"
template_id = "tpl"
public_key = "pk"
recipient = "owner@example.com"
"#;

const MINIMAL_CONFIG: &str = r#"
[service]
name = "bikeguard-monitor"

[service.http]
bind = "127.0.0.1"
port = 8080

[classifier]
endpoint = "https://generativelanguage.googleapis.com/v1beta/models"
model = "gemini-1.5-flash"

[report]
endpoint = "https://api.emailjs.com/api/v1.0/email/send"
service_id = ""
template_id = ""
public_key = ""
"#;

#[test]
fn loads_a_fully_specified_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, FULL_CONFIG);
    let config = Config::load(&path).unwrap();

    assert_eq!(config.service.name, "bikeguard-monitor");
    assert_eq!(config.service.http.bind, "0.0.0.0");
    assert_eq!(config.service.http.port, 9090);
    assert_eq!(config.capture.width, 1280);
    assert_eq!(config.capture.fps, 15);
    assert_eq!(config.detection.throttle_ms, 500);
    assert_eq!(config.detection.max_objects, 4);
    assert_eq!(
        config.detection.inference_url.as_deref(),
        Some("http://localhost:8765")
    );
    assert_eq!(config.classifier.api_key.as_deref(), Some("test-key"));
    assert_eq!(config.classifier.debounce_ms, 900);
    assert_eq!(config.report.recipient.as_deref(), Some("owner@example.com"));
}

#[test]
fn missing_sections_fall_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, MINIMAL_CONFIG);
    let config = Config::load(&path).unwrap();

    assert_eq!(config.capture.width, 640);
    assert_eq!(config.capture.height, 480);
    assert_eq!(config.capture.fps, 30);
    assert_eq!(config.detection.throttle_ms, 250);
    assert_eq!(config.detection.max_objects, 6);
    assert_eq!(config.detection.min_confidence, 0.25);
    assert!(config.detection.inference_url.is_none());
    assert_eq!(config.classifier.debounce_ms, 1200);
    assert!(config.classifier.api_key.is_none());
    assert!(config.report.recipient.is_none());
}

#[test]
fn missing_required_sections_fail_loading() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[service]\nname = \"x\"\n");
    assert!(Config::load(&path).is_err());
}

#[test]
fn nonexistent_file_fails_loading() {
    assert!(Config::load("/nonexistent/path/to/config").is_err());
}
