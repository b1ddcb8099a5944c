use crate::domain::model::TileSize;
use crate::domain::ports::KeyframeGenerator;
use crate::utils::error::{BridgeError, Result};
use regex::Regex;
use std::path::Path;

pub const DEFAULT_TEMPLATE: &str = "@keyframes bounce {\n  0%, 100% { transform: translateY(0); }\n  50% { transform: translateY(-${tile_size}px); }\n}\n";

/// Fills `${tile_size}` placeholders in a host-supplied CSS template.
///
/// Unknown placeholders are left untouched.
#[derive(Debug, Clone)]
pub struct TemplateKeyframes {
    template: String,
    placeholder: Regex,
}

impl TemplateKeyframes {
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let placeholder =
            Regex::new(r"\$\{([a-z_]+)\}").map_err(|e| BridgeError::ConfigValidationError {
                field: "keyframes.template".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            template: template.into(),
            placeholder,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let template = std::fs::read_to_string(path)?;
        Self::new(template)
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

impl KeyframeGenerator for TemplateKeyframes {
    fn generate_keyframes(&self, tile_size: TileSize) -> String {
        self.placeholder
            .replace_all(&self.template, |caps: &regex::Captures| match &caps[1] {
                "tile_size" => tile_size.to_string(),
                _ => caps[0].to_string(),
            })
            .into_owned()
    }
}
