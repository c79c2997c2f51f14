use std::{env, error, fmt, str::FromStr};

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Invalid {
        variable: String,
        value: String,
        reason: String,
    },
}

impl error::Error for ConfigError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Invalid {
                variable,
                value,
                reason,
            } => write!(f, "invalid value '{value}' for {variable}: {reason}"),
        }
    }
}

/// Source of configuration variables. The process environment in
/// production, a map in tests.
pub trait Lookup {
    fn get(&self, variable: &str) -> Option<String>;
}

pub struct ProcessEnv;

impl Lookup for ProcessEnv {
    fn get(&self, variable: &str) -> Option<String> {
        env::var(variable).ok()
    }
}

impl<F> Lookup for F
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, variable: &str) -> Option<String> {
        self(variable)
    }
}

/// Reads and parses `variable`. Unset and blank values are `None`.
pub fn optional<T, L>(lookup: &L, variable: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    L: Lookup + ?Sized,
{
    match lookup.get(variable) {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|why: T::Err| ConfigError::Invalid {
                variable: variable.to_owned(),
                value,
                reason: why.to_string(),
            }),
        _ => Ok(None),
    }
}

pub fn or_default<T, L>(lookup: &L, variable: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    L: Lookup + ?Sized,
{
    Ok(optional(lookup, variable)?.unwrap_or(default))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn missing_and_blank_are_none() {
        let env = lookup(&[("BLANK", "  ")]);
        assert_eq!(optional::<f64, _>(&env, "MISSING"), Ok(None));
        assert_eq!(optional::<f64, _>(&env, "BLANK"), Ok(None));
        assert_eq!(or_default(&env, "MISSING", 4u32), Ok(4));
    }

    #[test]
    fn parses_trimmed_values() {
        let env = lookup(&[("RADIUS", " 2.5 ")]);
        assert_eq!(optional::<f64, _>(&env, "RADIUS"), Ok(Some(2.5)));
    }

    #[test]
    fn reports_the_variable_on_error() {
        let env = lookup(&[("FLAG", "maybe")]);
        let error = optional::<bool, _>(&env, "FLAG").unwrap_err();
        assert!(error.to_string().contains("FLAG"));
        assert!(error.to_string().contains("maybe"));
    }
}
