use crate::adapters::keyframes::{TemplateKeyframes, DEFAULT_TEMPLATE};
use crate::core::bridge::BridgeOptions;
use crate::domain::model::STYLE_TARGET_ID;
use crate::utils::error::{BridgeError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub bridge: Option<BridgeSection>,
    pub audio: Option<AudioConfig>,
    pub cache: Option<CacheConfig>,
    pub keyframes: Option<KeyframesConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeSection {
    pub style_target_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    pub intro_track: String,
    pub start_latency_ms: Option<u64>,
    pub fade_duration_ms: Option<u64>,
    pub fade_steps: Option<u32>,
}

impl AudioConfig {
    pub fn start_latency_ms(&self) -> u64 {
        self.start_latency_ms.unwrap_or(150)
    }

    pub fn fade_duration_ms(&self) -> u64 {
        self.fade_duration_ms.unwrap_or(4000)
    }

    pub fn fade_steps(&self) -> u32 {
        self.fade_steps.unwrap_or(40)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// JSON file backing the cache; in-memory when absent
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyframesConfig {
    pub template: Option<String>,
    pub template_file: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub format: Option<LogFormat>,
}

impl BridgeConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${ASSET_DIR})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([A-Z][A-Z0-9_]*)\}").map_err(|e| {
            BridgeError::ConfigValidationError {
                field: "env_substitution".to_string(),
                message: e.to_string(),
            }
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn audio(&self) -> Result<&AudioConfig> {
        validation::validate_required_field("audio", &self.audio)
    }

    pub fn style_target_id(&self) -> &str {
        self.bridge
            .as_ref()
            .and_then(|b| b.style_target_id.as_deref())
            .unwrap_or(STYLE_TARGET_ID)
    }

    pub fn bridge_options(&self) -> BridgeOptions {
        BridgeOptions {
            style_target_id: self.style_target_id().to_string(),
        }
    }

    pub fn cache_path(&self) -> Option<&str> {
        self.cache.as_ref().and_then(|c| c.path.as_deref())
    }

    pub fn log_format(&self) -> LogFormat {
        self.logging
            .as_ref()
            .and_then(|l| l.format)
            .unwrap_or_default()
    }

    /// Keyframe generator from the inline template, the template file, or the default.
    pub fn keyframes(&self) -> Result<TemplateKeyframes> {
        match &self.keyframes {
            Some(KeyframesConfig {
                template: Some(template),
                ..
            }) => TemplateKeyframes::new(template.clone()),
            Some(KeyframesConfig {
                template_file: Some(path),
                ..
            }) => TemplateKeyframes::from_file(path),
            _ => TemplateKeyframes::new(DEFAULT_TEMPLATE),
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_element_id("bridge.style_target_id", self.style_target_id())?;

        let audio = self.audio()?;
        validation::validate_path("audio.intro_track", &audio.intro_track)?;
        validation::validate_range("audio.fade_steps", audio.fade_steps(), 1, 1000)?;
        validation::validate_positive_number("audio.fade_duration_ms", audio.fade_duration_ms(), 1)?;

        if let Some(path) = self.cache_path() {
            validation::validate_path("cache.path", path)?;
        }

        if let Some(keyframes) = &self.keyframes {
            if keyframes.template.is_some() && keyframes.template_file.is_some() {
                return Err(BridgeError::ConfigValidationError {
                    field: "keyframes".to_string(),
                    message: "Set either template or template_file, not both".to_string(),
                });
            }
            if let Some(template) = &keyframes.template {
                validation::validate_non_empty_string("keyframes.template", template)?;
            }
            if let Some(path) = &keyframes.template_file {
                validation::validate_existing_file("keyframes.template_file", path)?;
            }
        }

        Ok(())
    }
}

impl Validate for BridgeConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::TileSize;
    use crate::domain::ports::KeyframeGenerator;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[bridge]
style_target_id = "bounce-styles"

[audio]
intro_track = "assets/intro.ogg"
start_latency_ms = 80
fade_steps = 10

[cache]
path = "./state/cache.json"

[keyframes]
template = "@keyframes b { to { top: ${tile_size}px } }"

[logging]
format = "json"
"#;

        let config = BridgeConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.style_target_id(), "bounce-styles");
        let audio = config.audio().unwrap();
        assert_eq!(audio.start_latency_ms(), 80);
        assert_eq!(audio.fade_duration_ms(), 4000);
        assert_eq!(audio.fade_steps(), 10);
        assert_eq!(config.cache_path(), Some("./state/cache.json"));
        assert_eq!(config.log_format(), LogFormat::Json);
        assert!(config.validate().is_ok());

        let css = config
            .keyframes()
            .unwrap()
            .generate_keyframes(TileSize::new(16.0).unwrap());
        assert_eq!(css, "@keyframes b { to { top: 16px } }");
    }

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::from_toml_str("[audio]\nintro_track = \"intro.ogg\"\n").unwrap();

        assert_eq!(config.style_target_id(), STYLE_TARGET_ID);
        assert_eq!(config.cache_path(), None);
        assert_eq!(config.log_format(), LogFormat::Compact);
        assert_eq!(config.keyframes().unwrap().template(), DEFAULT_TEMPLATE);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PORT_BRIDGE_TEST_ASSETS", "/srv/assets");

        let config = BridgeConfig::from_toml_str(
            "[audio]\nintro_track = \"${PORT_BRIDGE_TEST_ASSETS}/intro.ogg\"\n",
        )
        .unwrap();
        assert_eq!(config.audio().unwrap().intro_track, "/srv/assets/intro.ogg");

        std::env::remove_var("PORT_BRIDGE_TEST_ASSETS");
    }

    #[test]
    fn test_missing_audio_section_fails_validation() {
        let config = BridgeConfig::from_toml_str("[cache]\npath = \"cache.json\"\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(BridgeError::MissingConfigError { field }) if field == "audio"
        ));
    }

    #[test]
    fn test_conflicting_keyframe_sources() {
        let toml_content = r#"
[audio]
intro_track = "intro.ogg"

[keyframes]
template = "x"
template_file = "x.css"
"#;
        let config = BridgeConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = BridgeConfig::from_toml_str("[audio\nintro_track = 1").unwrap_err();
        assert!(matches!(err, BridgeError::TomlParseError(_)));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[audio]\nintro_track = \"intro.ogg\"\nfade_steps = 0\n")
            .unwrap();

        let config = BridgeConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.audio().unwrap().fade_steps(), 0);
        assert!(config.validate().is_err());
    }
}
