//! Settings file loader.
//!
//! Reads an optional TOML file and deserializes it into [`Settings`]. A
//! missing file means built-in defaults, so a bare development run needs no
//! file at all. A file that exists but cannot be read or parsed is an error,
//! never replaced by the defaults. Environment and CLI overrides are applied
//! on top by the binary.

use std::path::Path;

use travela_types::config::Settings;
use travela_types::error::ConfigError;

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "travela.toml";

/// Load settings from `path`.
///
/// - If the file does not exist, returns [`Settings::default()`].
/// - If the file exists but cannot be read or parsed, returns an error.
/// - Otherwise returns the parsed settings; absent keys keep their defaults.
pub async fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No settings file at {}, using defaults", path.display());
            return Ok(Settings::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                source,
            });
        }
    };

    toml::from_str::<Settings>(&content).map_err(|err| ConfigError::Parse {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use travela_types::config::AppEnv;

    #[tokio::test]
    async fn load_settings_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let settings = load_settings(&tmp.path().join(DEFAULT_CONFIG_FILE))
            .await
            .unwrap();
        assert_eq!(settings.app_name, "travela");
        assert_eq!(settings.otp_max_attempts, 3);
    }

    #[tokio::test]
    async fn load_settings_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        tokio::fs::write(
            &path,
            r#"
app_name = "Travela"
app_env = "production"
africastalking_username = "sandbox"
otp_expiry_seconds = 120
allowed_hosts = ["https://travela.app"]
"#,
        )
        .await
        .unwrap();

        let settings = load_settings(&path).await.unwrap();
        assert_eq!(settings.app_name, "Travela");
        assert_eq!(settings.app_env, AppEnv::Production);
        assert_eq!(settings.africastalking_username, "sandbox");
        assert_eq!(settings.otp_expiry_seconds, 120);
        assert_eq!(settings.allowed_hosts, vec!["https://travela.app"]);
        assert_eq!(settings.jwt_access_token_expire_minutes, 30);
    }

    #[tokio::test]
    async fn load_settings_invalid_toml_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        tokio::fs::write(&path, "this is not { valid toml !!!")
            .await
            .unwrap();

        let err = load_settings(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[tokio::test]
    async fn load_settings_typo_in_production_file_does_not_fall_back() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        tokio::fs::write(
            &path,
            "app_env = \"production\"\njwt_secret_key = prod-secret\n",
        )
        .await
        .unwrap();

        let err = load_settings(&path).await.unwrap_err();
        assert!(err.to_string().contains(DEFAULT_CONFIG_FILE));
    }

    #[tokio::test]
    async fn load_settings_unreadable_path_is_an_error() {
        let tmp = TempDir::new().unwrap();
        // A directory exists but cannot be read as a file.
        let err = load_settings(tmp.path()).await.unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
