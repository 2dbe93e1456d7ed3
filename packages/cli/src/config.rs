use htmled_core_ast::SerializeOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "htmled.config.json";

/// htmled configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Stamp `data-id` on elements that lack one
    pub assign_ids: bool,

    /// Run the normalizer before serializing
    pub normalize: bool,

    pub pretty: bool,

    /// Write identities back into the markup
    pub include_ids: bool,

    pub escape_text: bool,

    pub indent: String,

    /// File extensions picked up when walking a directory
    pub extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assign_ids: true,
            normalize: true,
            pretty: false,
            include_ids: true,
            escape_text: true,
            indent: "  ".to_string(),
            extensions: vec!["html".to_string(), "htm".to_string()],
        }
    }
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn serialize_options(&self) -> SerializeOptions {
        SerializeOptions {
            escape_text: self.escape_text,
            include_identity: self.include_ids,
            pretty: self.pretty,
            indent: self.indent.clone(),
        }
    }

    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|wanted| wanted.eq_ignore_ascii_case(ext))
            })
    }
}
