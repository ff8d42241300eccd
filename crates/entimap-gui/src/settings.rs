use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub ui_scale: f32,
    pub last_view: LastView,
    /// Override for the XML document location. `None` means the default
    /// path in the user's data directory.
    pub data_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LastView {
    #[default]
    Cards,
    Table,
    Mindmap,
    Types,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            ui_scale: 1.0,
            last_view: LastView::default(),
            data_file: None,
        }
    }
}

impl AppSettings {
    pub fn load() -> Self {
        if let Some(config_dir) = dirs::config_dir() {
            let path = config_dir.join("entimap").join("settings.json");
            if path.exists() {
                match std::fs::read_to_string(&path) {
                    Ok(content) => match serde_json::from_str(&content) {
                        Ok(settings) => return settings,
                        Err(e) => tracing::error!("Failed to parse settings: {}", e),
                    },
                    Err(e) => tracing::error!("Failed to read settings file: {}", e),
                }
            } else {
                tracing::info!("Settings file not found, using defaults");
            }
        }
        Self::default()
    }

    pub fn save(&self) {
        if let Some(config_dir) = dirs::config_dir() {
            let app_dir = config_dir.join("entimap");
            if !app_dir.exists() {
                let _ = std::fs::create_dir_all(&app_dir);
            }
            let path = app_dir.join("settings.json");
            if let Ok(content) = serde_json::to_string_pretty(self) {
                let _ = std::fs::write(path, content);
            }
        }
    }

    /// Resolve the XML document path, honoring the override if set.
    pub fn data_file_path(&self) -> PathBuf {
        if let Some(path) = &self.data_file {
            return path.clone();
        }
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("entimap")
            .join("data.xml")
    }
}
