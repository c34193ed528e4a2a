//! Environment variable expansion for configuration strings.
//!
//! Credentials normally live in the environment, not the config file,
//! so string values support `${VAR}` references:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Bare `$VAR` syntax (no braces) is left untouched.

use crate::ConfigError;

/// Expand environment variable references in a string.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    // Fast path: nothing to expand
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, Unset> {
        match std::env::var(var) {
            Ok(val) => Ok(Some(val)),
            Err(_) => Err(Unset {
                var_name: var.to_owned(),
            }),
        }
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|err| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} is not set", err.cause.var_name),
    })
}

/// Lookup failure for an unset variable.
struct Unset {
    var_name: String,
}
