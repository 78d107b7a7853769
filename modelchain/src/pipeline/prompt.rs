//! Prompt construction from earlier stage outputs.

use super::StageOutput;
use regex::{Captures, Regex};
use std::fmt;
use std::sync::{Arc, OnceLock};

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{(request|previous|stage:([^{}]+))\}").expect("Valid placeholder pattern")
    })
}

/// What a stage can see when building its prompt.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    request: &'a str,
    outputs: &'a [StageOutput],
}

impl<'a> PromptContext<'a> {
    /// Creates a context over the initial request and prior outputs.
    #[must_use]
    pub const fn new(request: &'a str, outputs: &'a [StageOutput]) -> Self {
        Self { request, outputs }
    }

    /// The initial project request.
    #[must_use]
    pub const fn request(&self) -> &'a str {
        self.request
    }

    /// Outputs of the stages that already ran, in order.
    #[must_use]
    pub const fn outputs(&self) -> &'a [StageOutput] {
        self.outputs
    }

    /// Text of the stage that ran last, or the request for the first stage.
    #[must_use]
    pub fn previous(&self) -> &'a str {
        self.outputs.last().map_or(self.request, |o| o.text.as_str())
    }

    /// Text produced by the stage labelled `label`.
    #[must_use]
    pub fn output(&self, label: &str) -> Option<&'a str> {
        self.outputs
            .iter()
            .find(|o| o.label.trim() == label.trim())
            .map(|o| o.text.as_str())
    }
}

/// A prompt template with `{request}`, `{previous}` and `{stage:<label>}` slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    source: String,
}

impl PromptTemplate {
    /// Wraps a template string.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// The raw template.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Labels referenced through `{stage:<label>}`.
    #[must_use]
    pub fn stage_references(&self) -> Vec<String> {
        placeholder_regex()
            .captures_iter(&self.source)
            .filter_map(|caps| caps.get(2).map(|m| m.as_str().trim().to_string()))
            .collect()
    }

    /// Fills the placeholders.
    #[must_use]
    pub fn render(&self, ctx: &PromptContext<'_>) -> String {
        placeholder_regex()
            .replace_all(&self.source, |caps: &Captures<'_>| match &caps[1] {
                "request" => ctx.request().to_string(),
                "previous" => ctx.previous().to_string(),
                _ => caps
                    .get(2)
                    .and_then(|label| ctx.output(label.as_str().trim()))
                    .unwrap_or_default()
                    .to_string(),
            })
            .into_owned()
    }
}

/// Closure form of a prompt builder.
pub type PromptFn = dyn Fn(&PromptContext<'_>) -> String + Send + Sync;

/// Builds a stage's user text from the request and prior outputs.
#[derive(Clone)]
pub enum PromptBuilder {
    /// Placeholder template.
    Template(PromptTemplate),
    /// Arbitrary function.
    Custom(Arc<PromptFn>),
}

impl PromptBuilder {
    /// Creates a template builder.
    #[must_use]
    pub fn template(source: impl Into<String>) -> Self {
        Self::Template(PromptTemplate::new(source))
    }

    /// Creates a closure builder.
    pub fn custom<F>(func: F) -> Self
    where
        F: Fn(&PromptContext<'_>) -> String + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(func))
    }

    /// Produces the user text.
    #[must_use]
    pub fn build(&self, ctx: &PromptContext<'_>) -> String {
        match self {
            Self::Template(template) => template.render(ctx),
            Self::Custom(func) => func(ctx),
        }
    }

    /// Stage labels this builder is known to read. Closures report none.
    #[must_use]
    pub fn stage_references(&self) -> Vec<String> {
        match self {
            Self::Template(template) => template.stage_references(),
            Self::Custom(_) => Vec::new(),
        }
    }
}

impl fmt::Debug for PromptBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template(template) => f.debug_tuple("Template").field(&template.source).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
