//! Environment variable expansion for configuration strings.
//!
//! Supports two forms inside any string value:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Text outside `${...}` references is passed through unchanged.

use crate::ConfigError;

/// Expand environment variable references in a configuration string.
///
/// `field` names the config field being expanded (e.g. `server.host`) and is
/// carried into the error for diagnostics.
///
/// # Errors
///
/// Returns [`ConfigError::EnvVar`] if a `${VAR}` reference without a default
/// names an unset variable, or if a reference is unterminated.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    let mut result = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find('}') else {
            return Err(ConfigError::EnvVar {
                field: field.to_owned(),
                message: format!("unterminated ${{...}} reference in \"{value}\""),
            });
        };

        let reference = &after[..end];
        let expanded = match reference.split_once(":-") {
            Some((name, default)) => {
                std::env::var(name).unwrap_or_else(|_| default.to_owned())
            }
            None => std::env::var(reference).map_err(|_| ConfigError::EnvVar {
                field: field.to_owned(),
                message: format!("${{{reference}}} not set"),
            })?,
        };

        result.push_str(&expanded);
        rest = &after[end + 1..];
    }

    result.push_str(rest);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_passes_through() {
        assert_eq!(expand_env("0.0.0.0", "server.host").unwrap(), "0.0.0.0");
    }

    #[test]
    fn test_expands_set_variable() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("PORTICO_TEST_EXPAND", "example.org");
        }
        assert_eq!(
            expand_env("${PORTICO_TEST_EXPAND}", "server.host").unwrap(),
            "example.org"
        );
        unsafe {
            std::env::remove_var("PORTICO_TEST_EXPAND");
        }
    }

    #[test]
    fn test_default_used_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("PORTICO_TEST_MISSING");
        }
        assert_eq!(
            expand_env("${PORTICO_TEST_MISSING:-127.0.0.1}", "server.host").unwrap(),
            "127.0.0.1"
        );
    }

    #[test]
    fn test_missing_required_variable_errors() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("PORTICO_TEST_MISSING");
        }
        let err = expand_env("${PORTICO_TEST_MISSING}", "cors.origin").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("PORTICO_TEST_MISSING"));
        assert!(err.to_string().contains("cors.origin"));
    }

    #[test]
    fn test_unterminated_reference_errors() {
        let err = expand_env("${OOPS", "server.host").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("unterminated"));
    }

    #[test]
    fn test_surrounding_text_preserved() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("PORTICO_TEST_HOST", "internal");
        }
        assert_eq!(
            expand_env("https://${PORTICO_TEST_HOST}.example.com", "cors.origin").unwrap(),
            "https://internal.example.com"
        );
        unsafe {
            std::env::remove_var("PORTICO_TEST_HOST");
        }
    }
}
