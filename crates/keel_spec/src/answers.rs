//! Answers file loading.
//!
//! Answers are sectioned key/value pairs. The `general` section carries the
//! provider choice and provider-scoped keywords; every other section is
//! named after a component and carries its parameter values.
//!
//! ```toml
//! [general]
//! provider = "kubernetes"
//! namespace = "default"
//!
//! [mariadb]
//! db_user = "foo"
//! db_pass = "foo"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SpecError, SpecResult};
use crate::models::Application;

/// Section holding provider selection and provider configuration.
pub const GENERAL_SECTION: &str = "general";

/// Prefix of environment variables that override parameter values.
pub const ENV_PREFIX: &str = "KEEL_PARAM_";

const PROVIDER_KEY: &str = "provider";
const NAMESPACE_KEY: &str = "namespace";

/// Where a parameter value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamOrigin {
    Default,
    AnswersFile,
    Environment,
}

impl std::fmt::Display for ParamOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::AnswersFile => write!(f, "answers-file"),
            Self::Environment => write!(f, "environment"),
        }
    }
}

/// A supplied value together with its origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerValue {
    pub value: String,
    pub origin: ParamOrigin,
}

/// Scalar accepted in any answers format.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Str(s) => s,
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

type RawSections = IndexMap<String, IndexMap<String, Scalar>>;

/// Answers supplied for one application deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answers {
    sections: IndexMap<String, IndexMap<String, String>>,
    env_overrides: BTreeMap<String, String>,
}

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load answers from a file; the format follows the extension
    /// (`.yaml`/`.yml`, `.json`, anything else is TOML).
    pub fn load(path: &Path) -> SpecResult<Self> {
        debug!("Reading answers from {:?}", path);
        let content = fs::read_to_string(path)?;

        let parsed = match extension(path).as_deref() {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        };

        parsed.map_err(|e| SpecError::InvalidFormat {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn from_toml_str(content: &str) -> SpecResult<Self> {
        let raw: RawSections = toml::from_str(content)?;
        Ok(Self::from_raw(raw))
    }

    pub fn from_yaml_str(content: &str) -> SpecResult<Self> {
        let raw: Option<RawSections> = serde_yaml::from_str(content)?;
        Ok(Self::from_raw(raw.unwrap_or_default()))
    }

    pub fn from_json_str(content: &str) -> SpecResult<Self> {
        let raw: RawSections = serde_json::from_str(content)?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawSections) -> Self {
        let sections = raw
            .into_iter()
            .map(|(section, values)| {
                let values = values
                    .into_iter()
                    .map(|(key, value)| (key, value.into_string()))
                    .collect();
                (section, values)
            })
            .collect();

        Self {
            sections,
            env_overrides: BTreeMap::new(),
        }
    }

    /// Set a value in a section, creating the section if needed.
    pub fn set(&mut self, section: &str, key: impl Into<String>, value: impl Into<String>) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.into(), value.into());
    }

    pub fn with(mut self, section: &str, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(section, key, value);
        self
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|values| values.get(key))
            .map(String::as_str)
    }

    /// The `general` section.
    pub fn general(&self) -> BTreeMap<String, String> {
        self.sections
            .get(GENERAL_SECTION)
            .map(|values| values.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    /// The configured provider name, if any.
    pub fn provider(&self) -> Option<&str> {
        self.get(GENERAL_SECTION, PROVIDER_KEY)
    }

    pub fn set_provider(&mut self, provider: impl Into<String>) {
        self.set(GENERAL_SECTION, PROVIDER_KEY, provider);
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Record `KEEL_PARAM_<NAME>` variables as parameter overrides.
    ///
    /// Takes the variables explicitly so callers decide what the environment is.
    pub fn apply_env_overrides<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(name) = key.strip_prefix(ENV_PREFIX) {
                if !name.is_empty() {
                    debug!("Parameter override from environment: {}", key);
                    self.env_overrides.insert(name.to_string(), value);
                }
            }
        }
    }

    /// Answers visible to one component: general values, then the
    /// component's own section, then environment overrides.
    pub fn for_component(&self, component: &str) -> ComponentAnswers {
        let mut values = BTreeMap::new();

        for section in [GENERAL_SECTION, component] {
            if let Some(entries) = self.sections.get(section) {
                for (key, value) in entries {
                    values.insert(
                        key.clone(),
                        AnswerValue {
                            value: value.clone(),
                            origin: ParamOrigin::AnswersFile,
                        },
                    );
                }
            }
        }

        ComponentAnswers {
            values,
            env_overrides: self.env_overrides.clone(),
        }
    }

    /// Answers with every environment override written into the section of
    /// each component declaring that parameter, as persisted for a later
    /// `stop`.
    pub fn resolved_for(&self, app: &Application) -> Self {
        let mut resolved = Self {
            sections: self.sections.clone(),
            env_overrides: BTreeMap::new(),
        };

        for component in &app.components {
            for param in &component.params {
                if let Some(value) = self.env_overrides.get(&env_key(&param.name)) {
                    resolved.set(&component.name, param.name.clone(), value.clone());
                }
            }
        }
        resolved
    }

    /// Build a sample answers document for an application.
    pub fn sample_for(app: &Application, provider: &str) -> Self {
        let mut answers = Self::new()
            .with(GENERAL_SECTION, PROVIDER_KEY, provider)
            .with(GENERAL_SECTION, NAMESPACE_KEY, "default");

        for component in &app.components {
            let section = answers.sections.entry(component.name.clone()).or_default();
            for param in &component.params {
                section.insert(param.name.clone(), param.default.clone().unwrap_or_default());
            }
        }

        answers
    }

    pub fn to_toml_string(&self) -> SpecResult<String> {
        Ok(toml::to_string_pretty(&self.sections)?)
    }

    /// Write the answers to disk in the format implied by the extension.
    pub fn save(&self, path: &Path) -> SpecResult<()> {
        let content = match extension(path).as_deref() {
            Some("yaml") | Some("yml") => serde_yaml::to_string(&self.sections)?,
            Some("json") => serde_json::to_string_pretty(&self.sections)?,
            _ => self.to_toml_string()?,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_lowercase())
}

/// Answers as seen by one component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentAnswers {
    values: BTreeMap<String, AnswerValue>,
    env_overrides: BTreeMap<String, String>,
}

impl ComponentAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(
            name.into(),
            AnswerValue {
                value: value.into(),
                origin: ParamOrigin::AnswersFile,
            },
        );
        self
    }

    /// Look up a parameter; environment overrides win.
    pub fn get(&self, name: &str) -> Option<AnswerValue> {
        if let Some(value) = self.env_overrides.get(&env_key(name)) {
            return Some(AnswerValue {
                value: value.clone(),
                origin: ParamOrigin::Environment,
            });
        }
        self.values.get(name).cloned()
    }
}

fn env_key(name: &str) -> String {
    name.to_uppercase().replace(['-', '.'], "_")
}
