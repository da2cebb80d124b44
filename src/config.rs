use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    pub classifier: ClassifierConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptureConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetectionConfig {
    /// Minimum milliseconds between inference passes
    pub throttle_ms: u64,
    /// How many detections the live-object list retains
    pub max_objects: usize,
    /// Detections below this confidence are discarded
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,
    /// Remote inference server base URL, if detection is enabled
    pub inference_url: Option<String>,
}

fn default_min_confidence() -> f32 {
    0.25
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            throttle_ms: 250,
            max_objects: 6,
            min_confidence: default_min_confidence(),
            inference_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    pub endpoint: String,
    pub model: String,
    /// API key; falls back to the GEMINI_API_KEY environment variable
    pub api_key: Option<String>,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    1200
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    pub endpoint: String,
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
    /// Notification address; absent means reports fail with no recipient
    pub recipient: Option<String>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
