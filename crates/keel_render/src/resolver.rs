//! Parameter resolution.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use keel_spec::{ComponentAnswers, ParamDecl, ParamOrigin};

use crate::error::{RenderError, RenderResult};

/// A resolved parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedParam {
    pub value: String,
    pub origin: ParamOrigin,
}

/// Resolved parameters of one component, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedParams {
    params: BTreeMap<String, ResolvedParam>,
}

impl ResolvedParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>, origin: ParamOrigin) {
        self.params.insert(
            name.into(),
            ResolvedParam {
                value: value.into(),
                origin,
            },
        );
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value, ParamOrigin::AnswersFile);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(|p| p.value.as_str())
    }

    pub fn origin(&self, name: &str) -> Option<ParamOrigin> {
        self.params.get(name).map(|p| p.origin)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolvedParam)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Merges declared parameters with supplied answers.
pub struct ParameterResolver;

impl ParameterResolver {
    /// Resolve every declared parameter: the supplied answer if present,
    /// else the declared default, else `MissingRequiredParameter`.
    ///
    /// Pure: identical inputs give identical output.
    pub fn resolve(declared: &[ParamDecl], answers: &ComponentAnswers) -> RenderResult<ResolvedParams> {
        let mut resolved = ResolvedParams::new();

        for param in declared {
            let (value, origin) = match answers.get(&param.name) {
                Some(answer) => (answer.value, answer.origin),
                None => match &param.default {
                    Some(default) => (default.clone(), ParamOrigin::Default),
                    None => return Err(RenderError::MissingRequiredParameter(param.name.clone())),
                },
            };
            debug!("Resolved parameter {} from {}", param.name, origin);
            resolved.insert(param.name.clone(), value, origin);
        }

        Ok(resolved)
    }
}
