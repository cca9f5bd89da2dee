use std::path::PathBuf;

use clap::Parser;

use crate::crop::Crop;

fn default_origins() -> Vec<String> {
    // Vite dev server plus the preview port the front end ships with.
    [
        "http://localhost:5173",
        "http://127.0.0.1:5173",
        "http://localhost:8080",
        "http://127.0.0.1:8080",
    ]
    .map(str::to_string)
    .to_vec()
}

#[derive(Parser, Clone, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Address to bind the HTTP listener on
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    #[arg(short, long, default_value_t = 8000)]
    pub port: u16,

    /// Directory holding the per-crop model and class-map artifacts
    #[arg(short, long, default_value = "models")]
    pub model_dir: PathBuf,

    #[arg(short, long, default_value_t = 0)]
    pub device_id: i32,

    /// Units of preprocessing + inference work that may run at once
    #[arg(long, default_value_t = 2)]
    pub inference_workers: usize,

    /// Requests allowed to wait for a worker before new ones are rejected
    #[arg(long, default_value_t = 32)]
    pub max_pending_requests: usize,

    /// Largest accepted upload, in bytes
    #[arg(long, default_value_t = 10 * 1024 * 1024)]
    pub max_upload_bytes: usize,

    /// Origins allowed by CORS; repeat the flag for each origin
    #[arg(long = "allow-origin", default_values_t = default_origins())]
    pub allow_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self::parse()
    }

    pub fn model_path(&self, crop: Crop) -> PathBuf {
        self.model_dir.join(format!("{crop}_model.onnx"))
    }

    pub fn class_map_path(&self, crop: Crop) -> PathBuf {
        self.model_dir.join(format!("{crop}_class_map.json"))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: 8000,
            model_dir: PathBuf::from("models"),
            device_id: 0,
            inference_workers: 2,
            max_pending_requests: 32,
            max_upload_bytes: 10 * 1024 * 1024,
            allow_origins: default_origins(),
        }
    }

    #[test]
    fn test_artifact_paths_follow_crop_naming() {
        let config = test_config();
        assert_eq!(
            config.model_path(Crop::Mango),
            PathBuf::from("models/mango_model.onnx")
        );
        assert_eq!(
            config.class_map_path(Crop::Cashew),
            PathBuf::from("models/cashew_class_map.json")
        );
    }

    #[test]
    fn test_bind_addr_formatting() {
        assert_eq!(test_config().bind_addr(), "127.0.0.1:8000");
    }
}
