//! Environment variable expansion for configuration strings.
//!
//! Only the braced forms are recognized:
//! - `${VAR}` expands to the value of VAR and fails if it is unset
//! - `${VAR:-default}` falls back to `default` when VAR is unset

use crate::ConfigError;

/// Expand `${VAR}` references in a configuration value.
///
/// `field` is the dotted key of the value (e.g. `pdf.rasterizer`) and is only
/// used to build the error message. Values without `${` are returned as-is,
/// so bare `$VAR` text passes through untouched.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var).map(Some).map_err(|_| UnsetVar {
            name: var.to_owned(),
        })
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.name),
    })
}

/// Lookup failure for a referenced variable.
struct UnsetVar {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_set_var() {
        // SAFETY: each test uses its own variable name
        unsafe {
            std::env::set_var("MDPRESS_TEST_KROKI_HOST", "kroki.internal");
        }
        let result = expand_env("https://${MDPRESS_TEST_KROKI_HOST}", "diagrams.kroki_url").unwrap();
        assert_eq!(result, "https://kroki.internal");
        unsafe {
            std::env::remove_var("MDPRESS_TEST_KROKI_HOST");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: each test uses its own variable name
        unsafe {
            std::env::remove_var("MDPRESS_TEST_RASTERIZER");
        }
        let result =
            expand_env("${MDPRESS_TEST_RASTERIZER:-wkhtmltoimage}", "pdf.rasterizer").unwrap();
        assert_eq!(result, "wkhtmltoimage");
    }

    #[test]
    fn test_expand_value_wins_over_default() {
        // SAFETY: each test uses its own variable name
        unsafe {
            std::env::set_var("MDPRESS_TEST_BIN", "/opt/bin/render");
        }
        let result = expand_env("${MDPRESS_TEST_BIN:-wkhtmltoimage}", "pdf.rasterizer").unwrap();
        assert_eq!(result, "/opt/bin/render");
        unsafe {
            std::env::remove_var("MDPRESS_TEST_BIN");
        }
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        // SAFETY: each test uses its own variable name
        unsafe {
            std::env::remove_var("MDPRESS_TEST_MISSING");
        }
        let err = expand_env("${MDPRESS_TEST_MISSING}", "diagrams.kroki_url").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("MDPRESS_TEST_MISSING"));
        assert!(err.to_string().contains("diagrams.kroki_url"));
    }

    #[test]
    fn test_literal_and_bare_dollar_unchanged() {
        assert_eq!(expand_env("wkhtmltoimage", "pdf.rasterizer").unwrap(), "wkhtmltoimage");
        assert_eq!(expand_env("$HOME/bin", "pdf.rasterizer").unwrap(), "$HOME/bin");
    }
}
