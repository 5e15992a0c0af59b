//! Hypermedia response envelopes.
//!
//! Every endpoint answers with the same shape: operation-specific body fields
//! at the top level, plus optional `errors` and `links` lists. Responses are
//! assembled incrementally through [`EnvelopeBuilder`].
//!
//! # Usage
//!
//! ```rust,ignore
//! let envelope = deps
//!     .envelope()
//!     .body(json!({ "id": "p1" }))
//!     .link(Link::new("/places/p1", "self"))
//!     .when(expand, |b| b.body(json!({ "name": name })))
//!     .build();
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Hypermedia link descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    pub rel: String,
}

impl Link {
    pub fn new(href: impl Into<String>, rel: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            rel: rel.into(),
        }
    }
}

/// Error descriptor rendered in the envelope's `errors` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDescriptor {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorDescriptor {
    pub fn for_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl From<&str> for ErrorDescriptor {
    fn from(message: &str) -> Self {
        Self {
            message: message.to_string(),
            field: None,
        }
    }
}

impl From<String> for ErrorDescriptor {
    fn from(message: String) -> Self {
        Self {
            message,
            field: None,
        }
    }
}

/// Rendered response contract.
///
/// `errors` and `links` are left out of the JSON entirely when empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(flatten)]
    pub body: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

impl Envelope {
    /// Body field by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.body.get(field)
    }

    /// First link with the given relation.
    pub fn link(&self, rel: &str) -> Option<&Link> {
        self.links.iter().find(|link| link.rel == rel)
    }
}

/// Fluent, incremental envelope builder.
///
/// Root-relative hrefs are made absolute with the configured API host as soon
/// as they are added, so the accumulated link list is always absolute.
#[derive(Debug, Clone, Default)]
pub struct EnvelopeBuilder {
    api_host: String,
    body: Map<String, Value>,
    errors: Vec<ErrorDescriptor>,
    links: Vec<Link>,
}

impl EnvelopeBuilder {
    pub fn new(api_host: impl Into<String>) -> Self {
        Self {
            api_host: api_host.into().trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    /// Shallow-merge the fields of a JSON object into the body.
    ///
    /// Later writes win. Non-object values carry no field names and are
    /// dropped.
    pub fn body(mut self, partial: Value) -> Self {
        match partial {
            Value::Object(fields) => self.body.extend(fields),
            Value::Null => {}
            other => warn!(value = %other, "Ignoring non-object envelope body"),
        }
        self
    }

    /// Append one error.
    pub fn error(self, error: impl Into<ErrorDescriptor>) -> Self {
        self.errors([error])
    }

    /// Append a list of errors; bare strings become `{ message }`.
    pub fn errors<I, E>(mut self, errors: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<ErrorDescriptor>,
    {
        self.errors.extend(errors.into_iter().map(Into::into));
        self
    }

    /// Append one link.
    pub fn link(self, link: Link) -> Self {
        self.links([link])
    }

    /// Append links, rewriting root-relative hrefs to absolute URLs.
    pub fn links<I>(mut self, links: I) -> Self
    where
        I: IntoIterator<Item = Link>,
    {
        for link in links {
            let href = if link.href.is_empty() || link.href.starts_with('/') {
                format!("{}{}", self.api_host, link.href)
            } else {
                link.href
            };
            self.links.push(Link { href, rel: link.rel });
        }
        self
    }

    /// Apply `configure` to the builder only when `condition` holds.
    pub fn when<F>(self, condition: bool, configure: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        if condition {
            configure(self)
        } else {
            self
        }
    }

    /// Apply `configure` with the value only when one is present.
    pub fn when_some<T, F>(self, value: Option<T>, configure: F) -> Self
    where
        F: FnOnce(Self, T) -> Self,
    {
        match value {
            Some(value) => configure(self, value),
            None => self,
        }
    }

    /// A fresh builder sharing this builder's API host.
    pub fn fork(&self) -> Self {
        Self::new(self.api_host.clone())
    }

    pub fn build(self) -> Envelope {
        Envelope {
            body: self.body,
            errors: self.errors,
            links: self.links,
        }
    }
}
