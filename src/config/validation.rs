use crate::config::types::{CheckerConfig, Config, ScopeConfig};
use crate::scope::{Scope, ScopeRule};
use crate::{ConfigError, ConfigResult};
use encoding_rs::Encoding;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_checker_config(&config.checker)?;
    validate_scope_config(&config.scope)?;
    Ok(())
}

/// Validates checker configuration
fn validate_checker_config(config: &CheckerConfig) -> ConfigResult<()> {
    if config.recursion_depth < -1 {
        return Err(ConfigError::Validation(format!(
            "recursion-depth must be -1 (unbounded) or >= 0, got {}",
            config.recursion_depth
        )));
    }

    if Encoding::for_label(config.fallback_encoding.as_bytes()).is_none() {
        return Err(ConfigError::UnknownEncoding(
            config.fallback_encoding.clone(),
        ));
    }

    Ok(())
}

/// Validates scope configuration by compiling every pattern once
fn validate_scope_config(config: &ScopeConfig) -> ConfigResult<()> {
    for pattern in &config.intern_links {
        ScopeRule::new(pattern, Scope::Intern)?;
    }
    for pattern in &config.extern_links {
        ScopeRule::new(pattern, Scope::Extern)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_unbounded_recursion_allowed() {
        let mut config = Config::default();
        config.checker.recursion_depth = -1;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_negative_recursion_rejected() {
        let mut config = Config::default();
        config.checker.recursion_depth = -5;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_encoding_rejected() {
        let mut config = Config::default();
        config.checker.fallback_encoding = "klingon-1".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::UnknownEncoding(_))
        ));
    }

    #[test]
    fn test_utf8_encoding_accepted() {
        let mut config = Config::default();
        config.checker.fallback_encoding = "utf-8".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_bad_scope_pattern_rejected() {
        let mut config = Config::default();
        config.scope.extern_links = vec!["([unclosed".to_string()];
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }
}
