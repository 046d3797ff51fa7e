use recipe_core::{EngineConfig, DEFAULT_TOP_K};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Directory holding the persisted index bundle.
    pub index_dir: PathBuf,
    /// Image dataset root, laid out as `<category>/<filename>`.
    pub image_root: PathBuf,
    /// Served under `/static`; holds the default image.
    pub static_dir: PathBuf,
    pub top_k: usize,
    pub image_url_prefix: String,
    pub default_image_url: String,
    pub admin_token: Option<String>,
    /// Comma-separated origins; `None` allows any.
    pub cors_allow_origin: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            index_dir: PathBuf::from("./index"),
            image_root: PathBuf::from("./dataset/food-101/images"),
            static_dir: PathBuf::from("./static"),
            top_k: DEFAULT_TOP_K,
            image_url_prefix: "/images".to_string(),
            default_image_url: "/static/images/default.jpg".to_string(),
            admin_token: None,
            cors_allow_origin: None,
        }
    }
}

impl ServerSettings {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig { top_k: self.top_k, image_root: self.image_root.clone() }
    }
}
