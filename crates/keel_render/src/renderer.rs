//! Placeholder substitution.

use regex::{Captures, Regex};
use serde::Serialize;
use tracing::debug;

use keel_spec::Artifact;

use crate::error::{RenderError, RenderResult};
use crate::resolver::ResolvedParams;
use crate::syntax::PlaceholderSyntax;

const INLINE_ARTIFACT: &str = "<inline>";

/// Backend-ready artifact content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedArtifact {
    pub name: String,
    pub content: String,
    pub provider: Option<String>,
}

impl RenderedArtifact {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            provider: None,
        }
    }
}

/// Renders artifact content for one placeholder syntax.
pub struct TemplateRenderer {
    syntax: PlaceholderSyntax,
    pattern: Regex,
}

impl TemplateRenderer {
    pub fn new(syntax: PlaceholderSyntax) -> RenderResult<Self> {
        Ok(Self {
            syntax,
            pattern: Regex::new(syntax.pattern())?,
        })
    }

    pub fn syntax(&self) -> PlaceholderSyntax {
        self.syntax
    }

    /// Placeholder names in order of first appearance.
    pub fn placeholders(&self, content: &str) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for caps in self.pattern.captures_iter(content) {
            let name = placeholder_name(&caps);
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }

    /// Substitute every placeholder; any name missing from `params` fails
    /// the whole render.
    pub fn render(&self, content: &str, params: &ResolvedParams) -> RenderResult<String> {
        self.render_named(INLINE_ARTIFACT, content, params)
    }

    pub fn render_artifact(
        &self,
        artifact: &Artifact,
        params: &ResolvedParams,
    ) -> RenderResult<RenderedArtifact> {
        let content = self.render_named(&artifact.name, &artifact.content, params)?;
        Ok(RenderedArtifact {
            name: artifact.name.clone(),
            content,
            provider: artifact.provider.clone(),
        })
    }

    fn render_named(&self, artifact: &str, content: &str, params: &ResolvedParams) -> RenderResult<String> {
        let missing: Vec<String> = self
            .placeholders(content)
            .into_iter()
            .filter(|name| !params.contains(name))
            .collect();

        if !missing.is_empty() {
            return Err(RenderError::UnresolvedPlaceholder {
                artifact: artifact.to_string(),
                names: missing,
            });
        }

        let rendered = self
            .pattern
            .replace_all(content, |caps: &Captures| {
                let name = placeholder_name(caps);
                params
                    .get(name)
                    .map(str::to_string)
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned();

        debug!("Rendered {} with {} syntax", artifact, self.syntax);
        Ok(rendered)
    }
}

fn placeholder_name<'t>(caps: &Captures<'t>) -> &'t str {
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str())
        .unwrap_or_default()
}
