use crate::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// Runtime parameters passed to a scenario.
#[derive(Debug, Clone, Default)]
pub struct Params {
    values: HashMap<String, String>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter value.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parse from CLI args like "key=value".
    pub fn from_args(args: &[String]) -> Result<Self> {
        let mut params = Self::new();
        for arg in args {
            let (key, value) = arg.split_once('=').ok_or_else(|| {
                Error::Config(format!("invalid param '{}', expected key=value", arg))
            })?;
            if key.is_empty() {
                return Err(Error::Config(format!("invalid param '{}', empty key", arg)));
            }
            params.values.insert(key.to_string(), value.to_string());
        }
        Ok(params)
    }
}

/// Parameter definition in a scenario.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParamDef {
    #[serde(default)]
    pub required: bool,

    /// Environment variable consulted when no value is passed explicitly.
    pub env: Option<String>,

    pub default: Option<String>,

    pub description: Option<String>,
}

/// Resolve one parameter: explicit value, then environment, then default.
fn resolve(name: &str, params: &Params, def: &ParamDef) -> Result<String> {
    if let Some(v) = params.get(name) {
        return Ok(v.to_string());
    }
    if let Some(v) = def.env.as_deref().and_then(|var| std::env::var(var).ok()) {
        return Ok(v);
    }
    if let Some(ref v) = def.default {
        return Ok(v.clone());
    }
    if def.required {
        let hint = def
            .env
            .as_deref()
            .map(|var| format!(" (pass -P {}=... or set {})", name, var))
            .unwrap_or_default();
        return Err(Error::Config(format!(
            "missing required parameter: {}{}",
            name, hint
        )));
    }
    Ok(String::new())
}

/// Substitute `${var}` patterns in a string.
///
/// Names without a definition are taken from `params` if present and left
/// untouched otherwise.
pub fn substitute(
    template: &str,
    params: &Params,
    defs: &HashMap<String, ParamDef>,
) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("${") {
        let Some(len) = rest[open + 2..].find('}') else {
            break;
        };
        let name = &rest[open + 2..open + 2 + len];
        out.push_str(&rest[..open]);

        match defs.get(name) {
            Some(def) => out.push_str(&resolve(name, params, def)?),
            None => match params.get(name) {
                Some(v) => out.push_str(v),
                None => out.push_str(&rest[open..open + 3 + len]),
            },
        }
        rest = &rest[open + 3 + len..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Recursively substitute params in a serde_yaml::Value.
pub fn substitute_value(
    value: &mut serde_yaml::Value,
    params: &Params,
    defs: &HashMap<String, ParamDef>,
) -> Result<()> {
    match value {
        serde_yaml::Value::String(s) => {
            *s = substitute(s, params, defs)?;
        }
        serde_yaml::Value::Mapping(map) => {
            for (_, v) in map.iter_mut() {
                substitute_value(v, params, defs)?;
            }
        }
        serde_yaml::Value::Sequence(seq) => {
            for v in seq.iter_mut() {
                substitute_value(v, params, defs)?;
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defs(entries: &[(&str, ParamDef)]) -> HashMap<String, ParamDef> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_substitute_simple() {
        let params = Params::new().set("email", "admin@shop.test");
        let result = substitute("login as ${email}", &params, &HashMap::new()).unwrap();
        assert_eq!(result, "login as admin@shop.test");
    }

    #[test]
    fn test_substitute_multiple() {
        let params = Params::new().set("min", "10").set("max", "50");
        let result = substitute("${min}-${max}", &params, &HashMap::new()).unwrap();
        assert_eq!(result, "10-50");
    }

    #[test]
    fn test_unknown_left_as_is() {
        let result = substitute("${nope} stays", &Params::new(), &HashMap::new()).unwrap();
        assert_eq!(result, "${nope} stays");
    }

    #[test]
    fn test_unterminated_left_as_is() {
        let params = Params::new().set("a", "1");
        let result = substitute("${a} and ${b", &params, &HashMap::new()).unwrap();
        assert_eq!(result, "1 and ${b");
    }

    #[test]
    fn test_substitute_default() {
        let d = defs(&[(
            "category",
            ParamDef {
                default: Some("Hand Tools".into()),
                ..Default::default()
            },
        )]);
        let result = substitute("${category}", &Params::new(), &d).unwrap();
        assert_eq!(result, "Hand Tools");
    }

    #[test]
    fn test_substitute_from_env() {
        std::env::set_var("RANGESLIDE_TEST_PASSWORD", "from-env");
        let d = defs(&[(
            "password",
            ParamDef {
                required: true,
                env: Some("RANGESLIDE_TEST_PASSWORD".into()),
                ..Default::default()
            },
        )]);
        assert_eq!(substitute("${password}", &Params::new(), &d).unwrap(), "from-env");

        // Explicit values win over the environment.
        let params = Params::new().set("password", "explicit");
        assert_eq!(substitute("${password}", &params, &d).unwrap(), "explicit");
    }

    #[test]
    fn test_substitute_required_missing() {
        let d = defs(&[(
            "email",
            ParamDef {
                required: true,
                env: Some("RANGESLIDE_TEST_UNSET_EMAIL".into()),
                ..Default::default()
            },
        )]);
        let err = substitute("${email}", &Params::new(), &d).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("email"), "{}", msg);
        assert!(msg.contains("RANGESLIDE_TEST_UNSET_EMAIL"), "{}", msg);
    }

    #[test]
    fn test_optional_without_default_is_empty() {
        let d = defs(&[("note", ParamDef::default())]);
        assert_eq!(substitute("[${note}]", &Params::new(), &d).unwrap(), "[]");
    }

    #[test]
    fn test_params_from_args() {
        let args = vec!["email=a@b.c".to_string(), "query=pliers=x".to_string()];
        let params = Params::from_args(&args).unwrap();
        assert_eq!(params.get("email"), Some("a@b.c"));
        assert_eq!(params.get("query"), Some("pliers=x"));
    }

    #[test]
    fn test_params_from_args_invalid() {
        assert!(Params::from_args(&["novalue".to_string()]).is_err());
        assert!(Params::from_args(&["=x".to_string()]).is_err());
    }
}
