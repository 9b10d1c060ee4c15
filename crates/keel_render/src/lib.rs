//! # keel_render
//!
//! Parameter resolution and artifact rendering for keel.
//!
//! Resolution merges a component's declared parameters with the supplied
//! answers. Rendering substitutes the resolved values into artifact
//! content, using the placeholder syntax of the selected provider.
//!
//! ## Example
//!
//! ```rust
//! use keel_render::{ParameterResolver, PlaceholderSyntax, TemplateRenderer};
//! use keel_spec::{ComponentAnswers, ParamDecl};
//!
//! let declared = vec![ParamDecl::new("image").with_default("centos/httpd")];
//! let resolved = ParameterResolver::resolve(&declared, &ComponentAnswers::new()).unwrap();
//!
//! let renderer = TemplateRenderer::new(PlaceholderSyntax::Dollar).unwrap();
//! let rendered = renderer.render("docker run -d $image", &resolved).unwrap();
//! assert_eq!(rendered, "docker run -d centos/httpd");
//! ```

pub mod error;
pub mod renderer;
pub mod resolver;
pub mod syntax;

pub use error::{RenderError, RenderResult};
pub use renderer::{RenderedArtifact, TemplateRenderer};
pub use resolver::{ParameterResolver, ResolvedParam, ResolvedParams};
pub use syntax::PlaceholderSyntax;
