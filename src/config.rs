//! Startup configuration.
//!
//! The configuration is read once from a JSON file. The database password and
//! the bot token may also be supplied by the caller (CLI or environment), in
//! which case they take precedence and the file fields become optional.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Environment variable pointing at the configuration file.
pub const CONFIG_PATH_ENV: &str = "STRANGERBOT_CONFIG";

/// Reason given when the file does not have the expected shape.
const MALFORMED: &str = "required parameters are missing or malformed";

#[derive(Clone)]
pub struct Configuration {
    pub database_host: String,
    pub database_name: String,
    pub database_user: String,
    pub database_password: String,
    pub token: String,
    /// Passed through to the logging setup untouched.
    pub logging: serde_json::Value,
    pub admins_telegram_ids: Vec<i64>,
}

/// On-disk layout of the configuration file.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    database: DatabaseSection,
    logging: serde_json::Value,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    admins: Vec<i64>,
}

#[derive(Debug, Deserialize)]
struct DatabaseSection {
    host: String,
    name: String,
    user: String,
    #[serde(default)]
    password: Option<String>,
}

impl Configuration {
    /// Loads the configuration from `path`.
    ///
    /// `database_password` and `token` override the corresponding file values
    /// when given.
    pub fn load(
        path: impl AsRef<Path>,
        database_password: Option<String>,
        token: Option<String>,
    ) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let content = std::fs::read_to_string(path).map_err(|e| {
            let err = ConfigError::Io(display.clone());
            tracing::error!("{}: {}", err, e);
            err
        })?;

        Self::from_json_str(&content, &display, database_password, token)
    }

    /// Builds the configuration from already-read file content.
    ///
    /// `origin` only names the source in error messages.
    pub fn from_json_str(
        content: &str,
        origin: &str,
        database_password: Option<String>,
        token: Option<String>,
    ) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(content).map_err(|e| {
            let err = ConfigError::Parse(origin.to_string());
            tracing::error!("{}: {}", err, e);
            err
        })?;

        let file: ConfigFile = serde_json::from_value(value).map_err(|e| {
            let err = ConfigError::MissingField(MALFORMED.to_string());
            tracing::error!("Failed to obtain parameters from \"{}\": {}", origin, e);
            err
        })?;

        for (field, value) in [
            ("database.host", &file.database.host),
            ("database.name", &file.database.name),
            ("database.user", &file.database.user),
        ] {
            if value.is_empty() {
                return Err(missing(origin, field));
            }
        }

        let database_password = database_password
            .or(file.database.password)
            .ok_or_else(|| missing(origin, "database.password"))?;
        let token = token.or(file.token).ok_or_else(|| missing(origin, "token"))?;

        Ok(Self {
            database_host: file.database.host,
            database_name: file.database.name,
            database_user: file.database.user,
            database_password,
            token,
            logging: file.logging,
            admins_telegram_ids: file.admins,
        })
    }
}

fn missing(origin: &str, field: &'static str) -> ConfigError {
    tracing::error!("Failed to obtain parameters from \"{}\": {} is missing", origin, field);
    ConfigError::MissingField(field.to_string())
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("database_host", &self.database_host)
            .field("database_name", &self.database_name)
            .field("database_user", &self.database_user)
            .field("database_password", &"<redacted>")
            .field("token", &"<redacted>")
            .field("logging", &self.logging)
            .field("admins_telegram_ids", &self.admins_telegram_ids)
            .finish()
    }
}

/// Returns the configuration path to use when none is given.
///
/// - `STRANGERBOT_CONFIG` if set
/// - `<config dir>/strangerbot/config.json`
/// - `./config.json` as a last resort
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }

    dirs::config_dir()
        .map(|dir| dir.join("strangerbot").join("config.json"))
        .unwrap_or_else(|| PathBuf::from("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigErrorKind;
    use crate::logging::capture::CapturedLogs;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FULL: &str = r#"{
        "database": {"host": "db.local", "name": "randtalk", "user": "bot", "password": "secret"},
        "logging": {"level": "debug"},
        "token": "123:ABC",
        "admins": [31416, 27183]
    }"#;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    /// Runs `f` under a subscriber writing into the returned buffer.
    fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let result = tracing::subscriber::with_default(subscriber, f);
        (result, logs.contents())
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(FULL);
        let config = Configuration::load(file.path(), None, None).unwrap();

        assert_eq!(config.database_host, "db.local");
        assert_eq!(config.database_name, "randtalk");
        assert_eq!(config.database_user, "bot");
        assert_eq!(config.database_password, "secret");
        assert_eq!(config.token, "123:ABC");
        assert_eq!(config.logging["level"], "debug");
        assert_eq!(config.admins_telegram_ids, vec![31416, 27183]);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Configuration::load(dir.path().join("nope.json"), None, None).unwrap_err();

        assert_eq!(err.kind(), ConfigErrorKind::Io);
    }

    #[test]
    fn test_invalid_json() {
        let file = write_config("{ not json");
        let err = Configuration::load(file.path(), None, None).unwrap_err();

        assert_eq!(err.kind(), ConfigErrorKind::Parse);
    }

    #[test]
    fn test_missing_database_host() {
        let json = r#"{
            "database": {"name": "randtalk", "user": "bot", "password": "secret"},
            "logging": {},
            "token": "123:ABC"
        }"#;
        let err = Configuration::from_json_str(json, "test", None, None).unwrap_err();

        assert_eq!(err.kind(), ConfigErrorKind::MissingField);
    }

    #[test]
    fn test_database_not_an_object() {
        let json = r#"{"database": "db.local", "logging": {}, "token": "123:ABC"}"#;
        let err = Configuration::from_json_str(json, "test", None, None).unwrap_err();

        assert_eq!(err.kind(), ConfigErrorKind::MissingField);
    }

    #[test]
    fn test_top_level_not_an_object() {
        let err = Configuration::from_json_str("[1, 2, 3]", "test", None, None).unwrap_err();

        assert_eq!(err.kind(), ConfigErrorKind::MissingField);
    }

    #[test]
    fn test_shape_error_keeps_serde_detail_out_of_reason() {
        let json = r#"{"database": {"host": 1}, "logging": {}, "token": "123:ABC"}"#;
        let (result, logs) =
            with_captured_logs(|| Configuration::from_json_str(json, "test", None, None));

        let err = result.unwrap_err();
        assert_eq!(err, ConfigError::MissingField(MALFORMED.to_string()));
        assert!(!err.to_string().contains("line"));
        assert!(logs.contains("invalid type"));
    }

    #[test]
    fn test_empty_database_user() {
        let json = r#"{
            "database": {"host": "db.local", "name": "randtalk", "user": "", "password": "secret"},
            "logging": {},
            "token": "123:ABC"
        }"#;
        let err = Configuration::from_json_str(json, "test", None, None).unwrap_err();

        assert_eq!(err, ConfigError::MissingField("database.user".to_string()));
    }

    #[test]
    fn test_missing_logging() {
        let json = r#"{
            "database": {"host": "db.local", "name": "randtalk", "user": "bot", "password": "secret"},
            "token": "123:ABC"
        }"#;
        let err = Configuration::from_json_str(json, "test", None, None).unwrap_err();

        assert_eq!(err.kind(), ConfigErrorKind::MissingField);
    }

    #[test]
    fn test_token_override_wins() {
        let config =
            Configuration::from_json_str(FULL, "test", None, Some("override".to_string()))
                .unwrap();

        assert_eq!(config.token, "override");
        assert_eq!(config.database_password, "secret");
    }

    #[test]
    fn test_overrides_make_file_fields_optional() {
        let json = r#"{
            "database": {"host": "db.local", "name": "randtalk", "user": "bot"},
            "logging": {}
        }"#;
        let config = Configuration::from_json_str(
            json,
            "test",
            Some("pw".to_string()),
            Some("tok".to_string()),
        )
        .unwrap();

        assert_eq!(config.database_password, "pw");
        assert_eq!(config.token, "tok");
    }

    #[test]
    fn test_missing_token_without_override() {
        let json = r#"{
            "database": {"host": "db.local", "name": "randtalk", "user": "bot", "password": "pw"},
            "logging": {}
        }"#;
        let err = Configuration::from_json_str(json, "test", None, None).unwrap_err();

        assert_eq!(err, ConfigError::MissingField("token".to_string()));
    }

    #[test]
    fn test_admins_default_to_empty() {
        let json = r#"{
            "database": {"host": "db.local", "name": "randtalk", "user": "bot", "password": "pw"},
            "logging": {},
            "token": "tok"
        }"#;
        let config = Configuration::from_json_str(json, "test", None, None).unwrap();

        assert!(config.admins_telegram_ids.is_empty());
    }

    #[test]
    fn test_missing_file_is_logged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        let (result, logs) = with_captured_logs(|| Configuration::load(&path, None, None));

        assert_eq!(result.unwrap_err().kind(), ConfigErrorKind::Io);
        assert!(logs.contains("ERROR"));
        assert!(logs.contains(&format!("Failed to open \"{}\"", path.display())));
    }

    #[test]
    fn test_invalid_json_is_logged() {
        let file = write_config("{ not json");
        let (result, logs) = with_captured_logs(|| Configuration::load(file.path(), None, None));

        assert_eq!(result.unwrap_err().kind(), ConfigErrorKind::Parse);
        assert!(logs.contains("Failed to parse"));
        assert!(logs.contains("key must be a string"));
    }

    #[test]
    fn test_missing_field_is_logged() {
        let json = r#"{
            "database": {"host": "db.local", "name": "randtalk", "user": "bot", "password": "pw"},
            "logging": {}
        }"#;
        let (result, logs) =
            with_captured_logs(|| Configuration::from_json_str(json, "bot.json", None, None));

        assert_eq!(result.unwrap_err(), ConfigError::MissingField("token".to_string()));
        assert!(logs.contains("Failed to obtain parameters from \"bot.json\": token is missing"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Configuration::from_json_str(FULL, "test", None, None).unwrap();
        let debug = format!("{:?}", config);

        assert!(!debug.contains("secret"));
        assert!(!debug.contains("123:ABC"));
        assert!(debug.contains("db.local"));
    }
}
