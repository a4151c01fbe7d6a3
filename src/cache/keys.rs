//! Cache Key Construction
//!
//! Builds keys of the form `{namespace}:{resource-id}:{variant}` as pure
//! functions of their inputs: identical queries always produce the same key,
//! and distinct queries never alias.
//!
//! The variant encodes the requested view plus every parameter the cached
//! value depends on (pagination, filters, sort order), sorted so parameter
//! order does not matter. Separator characters inside segments are
//! percent-escaped, so a resource id containing `:` cannot collide with the
//! key structure, and [`resource_prefix`] stays a reliable invalidation
//! boundary (`student:42:` never matches keys of `student:420`).

// == Key Builder ==
/// Builder for a single cache key.
#[derive(Debug, Clone)]
pub struct KeyBuilder {
    namespace: String,
    resource: String,
    view: String,
    params: Vec<(String, String)>,
}

impl KeyBuilder {
    /// Starts a key for one view of one resource, e.g.
    /// `KeyBuilder::new("student", "42", "documents")`.
    pub fn new(
        namespace: impl Into<String>,
        resource: impl Into<String>,
        view: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            resource: resource.into(),
            view: view.into(),
            params: Vec::new(),
        }
    }

    /// Adds a parameter the cached value depends on.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Builds the final key string.
    pub fn build(mut self) -> String {
        let variant = if self.params.is_empty() {
            escape(&self.view)
        } else {
            self.params.sort();
            let query: Vec<String> = self
                .params
                .iter()
                .map(|(name, value)| format!("{}={}", escape(name), escape(value)))
                .collect();
            format!("{}?{}", escape(&self.view), query.join("&"))
        };

        format!(
            "{}:{}:{}",
            escape(&self.namespace),
            escape(&self.resource),
            variant
        )
    }
}

// == Resource Prefix ==
/// Invalidation prefix covering every cached variant of one resource.
///
/// Matches exactly the keys [`KeyBuilder`] produces for the same namespace
/// and resource id, and no others.
pub fn resource_prefix(namespace: &str, resource: &str) -> String {
    format!("{}:{}:", escape(namespace), escape(resource))
}

/// Percent-escapes the characters that carry structure inside a key.
fn escape(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for c in segment.chars() {
        match c {
            '%' => out.push_str("%25"),
            ':' => out.push_str("%3a"),
            '?' => out.push_str("%3f"),
            '&' => out.push_str("%26"),
            '=' => out.push_str("%3d"),
            _ => out.push(c),
        }
    }
    out
}
