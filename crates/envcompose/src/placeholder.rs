//! Walks a merged [`Tree`], substituting `%env(NAME)%` / `%env(TYPE:NAME)%`
//! placeholders with the named environment variable, coerced to the typed
//! scalar the type tag requests.

use regex::Regex;
use serde_json::{Map, Number, Value};
use std::sync::OnceLock;

use crate::env_accessor::EnvAccessor;
use crate::error::ConfigError;
use crate::tree::Tree;

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"%env\((?:([A-Za-z]+):)?([A-Z0-9_]+)\)%").expect("valid placeholder regex"))
}

/// The three typed coercions a placeholder may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlaceholderType {
    String,
    Number,
    Boolean,
}

impl PlaceholderType {
    fn parse(raw: Option<&str>) -> Option<Self> {
        match raw.map(str::to_ascii_lowercase).as_deref() {
            None | Some("string") => Some(PlaceholderType::String),
            Some("number") => Some(PlaceholderType::Number),
            Some("boolean") => Some(PlaceholderType::Boolean),
            Some(_) => None,
        }
    }
}

/// Resolves `%env(...)%` placeholders against an [`EnvAccessor`].
pub struct PlaceholderResolver<'a> {
    env: &'a mut EnvAccessor,
}

impl<'a> PlaceholderResolver<'a> {
    pub fn new(env: &'a mut EnvAccessor) -> Self {
        PlaceholderResolver { env }
    }

    /// Returns a new tree with every placeholder string resolved. Values
    /// produced by resolution are not themselves re-scanned: a resolved
    /// value that happens to look like another placeholder is left alone.
    pub fn resolve(&mut self, tree: &Tree) -> Result<Tree, ConfigError> {
        match tree {
            Value::String(s) => self.resolve_string(s),
            Value::Array(items) => {
                let resolved = items.iter().map(|item| self.resolve(item)).collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Array(resolved))
            }
            Value::Object(map) => {
                let mut out = Map::new();
                for (key, value) in map {
                    out.insert(key.clone(), self.resolve(value)?);
                }
                Ok(Value::Object(out))
            }
            other => Ok(other.clone()),
        }
    }

    fn resolve_string(&mut self, raw: &str) -> Result<Tree, ConfigError> {
        let pattern = placeholder_pattern();

        let Some(first_match) = pattern.find(raw) else {
            return Ok(Value::String(raw.to_string()));
        };

        if first_match.start() == 0 && first_match.end() == raw.len() {
            let captures = pattern.captures(raw).expect("find succeeded");
            return self.coerce(&captures);
        }

        let mut err = None;
        let replaced = pattern.replace_all(raw, |caps: &regex::Captures| match self.coerce(caps) {
            Ok(value) => stringify(&value),
            Err(e) => {
                err = Some(e);
                String::new()
            }
        });
        if let Some(e) = err {
            return Err(e);
        }
        Ok(Value::String(replaced.into_owned()))
    }

    fn coerce(&mut self, captures: &regex::Captures) -> Result<Tree, ConfigError> {
        let type_token = captures.get(1).map(|m| m.as_str());
        let name = captures.get(2).expect("name group always present").as_str();

        let placeholder_type = PlaceholderType::parse(type_token).ok_or_else(|| ConfigError::MissingEnv {
            name: format!("{name} (unknown placeholder type {:?})", type_token.unwrap_or("")),
        })?;

        let raw_value = self.env.read(name, None)?;

        Ok(match placeholder_type {
            PlaceholderType::String => Value::String(raw_value),
            PlaceholderType::Number => Value::Number(parse_number(&raw_value)),
            PlaceholderType::Boolean => Value::Bool(coerce_boolean(&raw_value)),
        })
    }
}

/// An unparsable numeric placeholder is the validator's problem, not this
/// resolver's. `serde_json::Number` cannot itself hold NaN/infinity, so
/// the sentinel is the largest representable value, which a schema with a
/// sane range check will reject.
fn non_finite_sentinel() -> Number {
    Number::from_f64(f64::MAX).unwrap_or_else(|| Number::from(i64::MAX))
}

/// Parses a `number`-typed placeholder's raw text, preferring an
/// integer-backed [`Number`] so a clean value like `8080` deserializes into
/// an integer schema field rather than tripping a "floating point, expected
/// u32" error. Falls back to `f64`, then to [`non_finite_sentinel`].
fn parse_number(raw: &str) -> Number {
    if let Ok(n) = raw.parse::<i64>() {
        return Number::from(n);
    }
    match raw.parse::<f64>() {
        Ok(n) => Number::from_f64(n).unwrap_or_else(non_finite_sentinel),
        Err(_) => non_finite_sentinel(),
    }
}

fn coerce_boolean(raw: &str) -> bool {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "on" => true,
        "false" | "0" | "no" | "n" | "off" => false,
        other => !other.is_empty(),
    }
}

fn stringify(value: &Tree) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;

    fn set(key: &str, value: &str) {
        // SAFETY: serialized by #[serial].
        unsafe { std::env::set_var(key, value) };
    }

    fn unset(key: &str) {
        // SAFETY: serialized by #[serial].
        unsafe { std::env::remove_var(key) };
    }

    #[test]
    #[serial]
    fn whole_string_match_yields_native_value() {
        set("PH_PORT", "8080");
        let mut env = EnvAccessor::new();
        let mut resolver = PlaceholderResolver::new(&mut env);
        let resolved = resolver.resolve(&json!("%env(number:PH_PORT)%")).unwrap();
        assert_eq!(resolved, json!(8080));
        unset("PH_PORT");
    }

    #[test]
    #[serial]
    fn partial_match_interpolates_into_string() {
        set("PH_PORT2", "8080");
        let mut env = EnvAccessor::new();
        let mut resolver = PlaceholderResolver::new(&mut env);
        let resolved = resolver.resolve(&json!("http://h:%env(number:PH_PORT2)%")).unwrap();
        assert_eq!(resolved, json!("http://h:8080"));
        unset("PH_PORT2");
    }

    #[test]
    #[serial]
    fn boolean_coercion_accepts_documented_tokens() {
        set("PH_FLAG", "yes");
        let mut env = EnvAccessor::new();
        let mut resolver = PlaceholderResolver::new(&mut env);
        let resolved = resolver.resolve(&json!("%env(boolean:PH_FLAG)%")).unwrap();
        assert_eq!(resolved, json!(true));
        unset("PH_FLAG");
    }

    #[test]
    fn trees_without_placeholders_are_unchanged() {
        let mut env = EnvAccessor::new();
        let mut resolver = PlaceholderResolver::new(&mut env);
        let tree = json!({"a": 1, "b": [true, null, "plain"]});
        assert_eq!(resolver.resolve(&tree).unwrap(), tree);
    }

    #[test]
    #[serial]
    fn missing_env_without_default_is_an_error() {
        unset("PH_MISSING_XYZ");
        let mut env = EnvAccessor::new();
        let mut resolver = PlaceholderResolver::new(&mut env);
        let err = resolver.resolve(&json!("%env(PH_MISSING_XYZ)%")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv { .. }));
    }
}
