use std::path::PathBuf;

use crate::policy::{AccessPolicy, PolicyError};

#[derive(Debug, serde::Deserialize)]
pub struct Settings {
    /// YAML policy file. The built-in policy is used when unset.
    pub policy_file: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            policy_file: None,
            log_filter: "warn".to_string(),
        }
    }
}

impl Settings {
    /// Resolves the access policy, preferring `override_file` over the
    /// configured `policy_file`.
    pub fn load_policy(&self, override_file: Option<&PathBuf>) -> Result<AccessPolicy, PolicyError> {
        match override_file.or(self.policy_file.as_ref()) {
            Some(path) => AccessPolicy::from_file(path),
            None => {
                tracing::debug!("No policy file configured, using built-in policy");
                Ok(AccessPolicy::builtin())
            }
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Optional `inmo.{yaml,toml,json}` in the working directory, then
    // INMO_* environment variables (INMO_POLICY_FILE, INMO_LOG_FILTER).
    let settings = config::Config::builder()
        .set_default("log_filter", "warn")?
        .add_source(config::File::with_name("inmo").required(false))
        .add_source(config::Environment::with_prefix("INMO"))
        .build()?;

    settings.try_deserialize()
}

/// Settings for one run.
///
/// With an explicit policy file the settings source only carries logging
/// options, so a broken one is handed back next to the defaults instead of
/// aborting the run. Without it the failure is a policy error.
pub fn resolve_settings(
    loaded: Result<Settings, config::ConfigError>,
    explicit_policy: bool,
) -> Result<(Settings, Option<PolicyError>), PolicyError> {
    match loaded {
        Ok(settings) => Ok((settings, None)),
        Err(err) if explicit_policy => Ok((Settings::default(), Some(PolicyError::from(err)))),
        Err(err) => Err(PolicyError::from(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_policy_defaults_to_builtin() {
        let settings = Settings {
            policy_file: None,
            log_filter: "warn".to_string(),
        };
        assert_eq!(settings.load_policy(None).unwrap(), AccessPolicy::builtin());
    }

    #[test]
    fn test_broken_settings_fail_without_explicit_policy() {
        let loaded = Err(config::ConfigError::Message("bad inmo.yaml".to_string()));
        let err = resolve_settings(loaded, false).unwrap_err();
        assert!(matches!(err, PolicyError::Config(_)));
        assert!(err.to_string().contains("bad inmo.yaml"));
    }

    #[test]
    fn test_broken_settings_fall_back_with_explicit_policy() {
        let loaded = Err(config::ConfigError::Message("bad inmo.yaml".to_string()));
        let (settings, warning) = resolve_settings(loaded, true).unwrap();
        assert_eq!(settings.log_filter, "warn");
        assert!(settings.policy_file.is_none());
        assert!(matches!(warning, Some(PolicyError::Config(_))));
    }

    #[test]
    fn test_loaded_settings_pass_through() {
        let loaded = Ok(Settings {
            policy_file: Some(PathBuf::from("policy.yaml")),
            log_filter: "debug".to_string(),
        });
        let (settings, warning) = resolve_settings(loaded, false).unwrap();
        assert_eq!(settings.log_filter, "debug");
        assert!(warning.is_none());
    }

    #[test]
    fn test_override_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.yaml");
        std::fs::write(
            &path,
            "plans:\n  - { id: 9, nombre: Demo, limiteUsuarios: 2, limitePropiedades: 2 }\n",
        )
        .unwrap();
        let settings = Settings {
            policy_file: Some(PathBuf::from("/nonexistent.yaml")),
            log_filter: "warn".to_string(),
        };
        let policy = settings.load_policy(Some(&path)).unwrap();
        assert_eq!(policy.plans.len(), 1);
        assert!(settings.load_policy(None).is_err());
    }
}
