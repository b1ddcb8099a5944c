use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Port table is missing channels: {}", .names.join(", "))]
    MissingChannels { names: Vec<String> },

    #[error("Channel '{channel}' already has a subscriber")]
    AlreadySubscribed { channel: String },

    #[error("Audio resource failed to load: {message}")]
    AudioLoad { message: String },

    #[error("Element '{id}' not found in host document")]
    MissingElement { id: String },

    #[error("Invalid payload on '{channel}': {reason}")]
    InvalidPayload { channel: String, reason: String },

    #[error("Unknown channel: {name}")]
    UnknownChannel { name: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 應用程式與橋接器之間的契約不符
    Contract,
    /// 宿主環境 (DOM、音訊) 問題
    Host,
    Payload,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl BridgeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            BridgeError::MissingChannels { .. }
            | BridgeError::AlreadySubscribed { .. }
            | BridgeError::UnknownChannel { .. } => ErrorCategory::Contract,
            BridgeError::AudioLoad { .. } | BridgeError::MissingElement { .. } => {
                ErrorCategory::Host
            }
            BridgeError::InvalidPayload { .. } => ErrorCategory::Payload,
            BridgeError::TomlParseError(_)
            | BridgeError::ConfigValidationError { .. }
            | BridgeError::InvalidConfigValueError { .. }
            | BridgeError::MissingConfigError { .. } => ErrorCategory::Configuration,
            BridgeError::IoError(_) | BridgeError::SerializationError(_) => ErrorCategory::System,
        }
    }

    /// 決定錯誤嚴重程度 (CLI 依此決定退出碼)
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BridgeError::MissingElement { .. } | BridgeError::InvalidPayload { .. } => {
                ErrorSeverity::Low
            }
            BridgeError::UnknownChannel { .. } => ErrorSeverity::Medium,
            BridgeError::MissingChannels { .. }
            | BridgeError::AlreadySubscribed { .. }
            | BridgeError::AudioLoad { .. }
            | BridgeError::TomlParseError(_)
            | BridgeError::ConfigValidationError { .. }
            | BridgeError::InvalidConfigValueError { .. }
            | BridgeError::MissingConfigError { .. } => ErrorSeverity::High,
            BridgeError::IoError(_) | BridgeError::SerializationError(_) => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() >= ErrorSeverity::High
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            BridgeError::MissingChannels { .. } => {
                "Check that the application build and the bridge agree on port names".to_string()
            }
            BridgeError::AlreadySubscribed { .. } => {
                "Bind the bridge only once per application instance".to_string()
            }
            BridgeError::AudioLoad { .. } => {
                "Verify that [audio].intro_track points to a readable file".to_string()
            }
            BridgeError::MissingElement { id } => {
                format!("Add an element with id '{}' to the host document", id)
            }
            BridgeError::InvalidPayload { .. } => {
                "Check the value the application sends on this port".to_string()
            }
            BridgeError::UnknownChannel { .. } => {
                "Use one of the outbound channel names exposed by the application".to_string()
            }
            BridgeError::TomlParseError(_) => "Check the TOML syntax of the config file".to_string(),
            BridgeError::ConfigValidationError { field, .. }
            | BridgeError::InvalidConfigValueError { field, .. }
            | BridgeError::MissingConfigError { field } => {
                format!("Fix the '{}' setting in the config file", field)
            }
            BridgeError::IoError(_) => "Check file paths and permissions".to_string(),
            BridgeError::SerializationError(_) => {
                "Check that the input is valid JSON".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Contract => format!("Port contract mismatch: {}", self),
            ErrorCategory::Host => format!("Host environment problem: {}", self),
            ErrorCategory::Payload => format!("Ignored message: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
