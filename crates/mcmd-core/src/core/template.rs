use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TemplateError {
    #[error("Template file not found: {path}")]
    NotFound { path: String },

    #[error("Template file is empty: {path}")]
    Empty { path: String },

    #[error("Failed to read template '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Unresolved placeholders remain in the rendered template: {}", .tokens.join(", "))]
    Unresolved { tokens: Vec<String> },
}

/// Placeholder token to literal value pairs.
///
/// Keys are unique. [`RenderMapping::substitution_order`] yields them longest first,
/// with equal lengths ordered lexicographically, so a key that is a prefix of another
/// can never consume part of the longer one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderMapping {
    entries: BTreeMap<String, String>,
}

impl RenderMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: impl Into<String>, value: impl ToString) -> &mut Self {
        self.entries.insert(token.into(), value.to_string());
        self
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn substitution_order(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = self
            .entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        pairs.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        pairs
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for RenderMapping {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut mapping = Self::new();
        for (k, v) in iter {
            mapping.insert(k, v);
        }
        mapping
    }
}

/// Replaces every occurrence of every mapping key in `template`.
///
/// With `strict`, any of `required_tokens` still present afterwards fails the render
/// and all of the leftovers are reported together.
pub fn render<S: AsRef<str>>(
    template: &str,
    mapping: &RenderMapping,
    strict: bool,
    required_tokens: &[S],
) -> Result<String, TemplateError> {
    let mut text = template.to_string();
    for (token, value) in mapping.substitution_order() {
        if token.is_empty() {
            continue;
        }
        text = text.replace(token, value);
    }

    if strict {
        let leftovers: Vec<String> = required_tokens
            .iter()
            .map(AsRef::as_ref)
            .filter(|token| !token.is_empty() && text.contains(*token))
            .map(str::to_string)
            .collect();
        if !leftovers.is_empty() {
            return Err(TemplateError::Unresolved { tokens: leftovers });
        }
    }
    Ok(text)
}

/// Loads a template, rejecting missing files and files with no non-whitespace content.
pub fn load_template(path: &Path) -> Result<String, TemplateError> {
    let display = path.to_string_lossy().to_string();
    match fs::read_to_string(path) {
        Ok(text) if text.trim().is_empty() => Err(TemplateError::Empty { path: display }),
        Ok(text) => Ok(text),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(TemplateError::NotFound { path: display })
        }
        Err(e) => Err(TemplateError::Io {
            path: display,
            message: e.to_string(),
        }),
    }
}
