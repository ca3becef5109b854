//! Service configuration.
//!
//! Settings live in `dxldomaintoolsservice.toml` inside the configuration
//! directory:
//!
//! ```toml
//! [General]
//! apiUser = "<DomainTools API user>"
//! apiKey = "<DomainTools API key>"
//!
//! [Service]            # optional
//! serviceType = "/opendxl-domaintools/service/domaintools"
//! ```
//!
//! The API user and key are required. A missing or empty value is fatal and
//! the error names the configuration file.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// File name of the service configuration inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "dxldomaintoolsservice.toml";

/// Service type (topic prefix) all request topics are registered under.
pub const DEFAULT_SERVICE_TYPE: &str = "/opendxl-domaintools/service/domaintools";

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Fatal configuration errors raised at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unable to read configuration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to parse configuration file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("DomainTools API Key not found in configuration file: {}", path.display())]
    MissingApiKey { path: PathBuf },
    #[error("DomainTools API User not found in configuration file: {}", path.display())]
    MissingApiUser { path: PathBuf },
}

// ---------------------------------------------------------------------------
// File schema
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(rename = "General", default)]
    general: Option<RawGeneral>,
    #[serde(rename = "Service", default)]
    service: Option<RawService>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGeneral {
    api_key: Option<String>,
    api_user: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawService {
    service_type: Option<String>,
}

impl RawConfig {
    fn api_key(&self) -> Option<&str> {
        self.general
            .as_ref()
            .and_then(|g| non_empty(g.api_key.as_deref()))
    }

    fn api_user(&self) -> Option<&str> {
        self.general
            .as_ref()
            .and_then(|g| non_empty(g.api_user.as_deref()))
    }

    fn service_type(&self) -> Option<&str> {
        self.service
            .as_ref()
            .and_then(|s| non_empty(s.service_type.as_deref()))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// ApiCredentials / ServiceConfig
// ---------------------------------------------------------------------------

/// Credentials for the remote DomainTools API.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredentials {
    pub api_user: String,
    pub api_key: String,
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_user", &self.api_user)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Validated service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// File the configuration was read from.
    pub path: PathBuf,
    pub credentials: ApiCredentials,
    /// Topic prefix for all request topics.
    pub service_type: String,
}

impl ServiceConfig {
    /// Loads `dxldomaintoolsservice.toml` from `config_dir`.
    ///
    /// # Errors
    ///
    /// See [`ServiceConfig::from_file`].
    pub fn load(config_dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_file(config_dir.as_ref().join(CONFIG_FILE_NAME))
    }

    /// Loads the configuration from an explicit file path.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` or `ConfigError::Parse` if the file cannot
    /// be read or is not valid TOML, and `ConfigError::MissingApiKey` /
    /// `ConfigError::MissingApiUser` if a required setting is absent.
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_toml_str(&contents, path)
    }

    /// Parses configuration text. `path` is only used for error messages.
    ///
    /// # Errors
    ///
    /// See [`ServiceConfig::from_file`].
    pub fn from_toml_str(contents: &str, path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let raw: RawConfig = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;

        let Some(api_key) = raw.api_key() else {
            return Err(ConfigError::MissingApiKey { path });
        };
        let Some(api_user) = raw.api_user() else {
            return Err(ConfigError::MissingApiUser { path });
        };

        let credentials = ApiCredentials {
            api_user: api_user.to_string(),
            api_key: api_key.to_string(),
        };
        let service_type = raw.service_type().map_or_else(
            || DEFAULT_SERVICE_TYPE.to_string(),
            |s| s.trim_end_matches('/').to_string(),
        );

        Ok(Self {
            path,
            credentials,
            service_type,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const VALID: &str = r#"
[General]
apiUser = "alice"
apiKey = "secret"
"#;

    #[test]
    fn parses_credentials_and_default_service_type() {
        let config = ServiceConfig::from_toml_str(VALID, "/etc/dt.toml").unwrap();
        assert_eq!(config.credentials.api_user, "alice");
        assert_eq!(config.credentials.api_key, "secret");
        assert_eq!(config.service_type, DEFAULT_SERVICE_TYPE);
        assert_eq!(config.path, PathBuf::from("/etc/dt.toml"));
    }

    #[test]
    fn service_type_can_be_overridden() {
        let text = format!("{VALID}\n[Service]\nserviceType = \"/custom/dt/\"\n");
        let config = ServiceConfig::from_toml_str(&text, "dt.toml").unwrap();
        assert_eq!(config.service_type, "/custom/dt");
    }

    #[test]
    fn missing_key_names_the_file() {
        let text = "[General]\napiUser = \"alice\"\n";
        let err = ServiceConfig::from_toml_str(text, "/etc/dt.toml").unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey { .. }));
        assert_eq!(
            err.to_string(),
            "DomainTools API Key not found in configuration file: /etc/dt.toml"
        );
    }

    #[test]
    fn empty_user_is_treated_as_missing() {
        let text = "[General]\napiKey = \"k\"\napiUser = \"  \"\n";
        let err = ServiceConfig::from_toml_str(text, "/etc/dt.toml").unwrap_err();
        assert_eq!(
            err.to_string(),
            "DomainTools API User not found in configuration file: /etc/dt.toml"
        );
    }

    #[test]
    fn missing_section_reports_key_first() {
        let err = ServiceConfig::from_toml_str("", "dt.toml").unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey { .. }));
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let err = ServiceConfig::from_toml_str("[General\n", "dt.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn load_reads_file_from_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join(CONFIG_FILE_NAME)).unwrap();
        file.write_all(VALID.as_bytes()).unwrap();

        let config = ServiceConfig::load(dir.path()).unwrap();
        assert_eq!(config.credentials.api_user, "alice");
        assert_eq!(config.path, dir.path().join(CONFIG_FILE_NAME));
    }

    #[test]
    fn load_missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ServiceConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = ServiceConfig::from_toml_str(VALID, "dt.toml").unwrap();
        let out = format!("{config:?}");
        assert!(out.contains("alice"));
        assert!(!out.contains("secret"));
    }
}
