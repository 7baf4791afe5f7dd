//! The request surface the framework reads from.
//!
//! The transport belongs to the host: it decodes the HTTP request, including
//! multipart bodies, and exposes the result through [`HostRequest`]. The
//! framework only reads parameters, file parts and the session, and writes
//! request attributes for the view.
//!
//! [`Request`] is a plain in-memory implementation, used by hosts that
//! decode everything up front and by the [`test`](crate::test) helpers.

use bytes::Bytes;
use indexmap::IndexMap;
use serde_json::Value;

use crate::Result;
use crate::session::Session;

/// A file part of a multipart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// The filename sent by the client, if any.
    pub filename: Option<String>,
    /// The content type sent by the client, if any.
    pub content_type: Option<String>,
    /// The raw content of the part.
    pub content: Bytes,
}

impl FilePart {
    /// Creates a part with the given filename and content.
    #[must_use]
    pub fn new<T: Into<Bytes>>(filename: Option<&str>, content: T) -> Self {
        Self {
            filename: filename.map(ToOwned::to_owned),
            content_type: None,
            content: content.into(),
        }
    }

    /// Sets the content type of the part.
    #[must_use]
    pub fn with_content_type<T: Into<String>>(mut self, content_type: T) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// A request as delivered by the host.
pub trait HostRequest {
    /// The first raw value of the parameter `name`.
    fn parameter(&self, name: &str) -> Option<String>;

    /// The names of every parameter of the request.
    fn parameter_keys(&self) -> Vec<String>;

    /// The file part named `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the part exists but cannot be read. The
    /// dispatcher answers such a request with a 500 response.
    fn file_part(&self, name: &str) -> Result<Option<FilePart>>;

    /// The session of the caller.
    fn session(&self) -> Session;

    /// The request attribute `name`.
    fn attribute(&self, name: &str) -> Option<Value>;

    /// Sets the request attribute `name`, visible to the view.
    fn set_attribute(&mut self, name: &str, value: Value);
}

/// An in-memory request.
///
/// # Examples
///
/// ```
/// use winter::request::{HostRequest, Request};
///
/// let request = Request::from_urlencoded(b"name=Ann&tags=a&tags=b");
///
/// assert_eq!(request.parameter("name").as_deref(), Some("Ann"));
/// assert_eq!(request.parameter_values("tags"), ["a", "b"]);
/// assert_eq!(request.parameter_keys(), ["name", "tags"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Request {
    parameters: IndexMap<String, Vec<String>>,
    files: IndexMap<String, FilePart>,
    attributes: IndexMap<String, Value>,
    session: Session,
}

impl Request {
    /// Creates an empty request with a fresh in-memory session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a request with the parameters of a form-encoded body or
    /// query string.
    #[must_use]
    pub fn from_urlencoded(input: &[u8]) -> Self {
        let mut request = Self::new();
        request.extend_urlencoded(input);
        request
    }

    /// Adds the parameters of a form-encoded body or query string.
    pub fn extend_urlencoded(&mut self, input: &[u8]) {
        for (name, value) in form_urlencoded::parse(input) {
            self.add_parameter(name, value);
        }
    }

    /// Adds a value to the parameter `name`.
    pub fn add_parameter<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) {
        self.parameters
            .entry(name.into())
            .or_default()
            .push(value.into());
    }

    /// Every raw value of the parameter `name`.
    #[must_use]
    pub fn parameter_values(&self, name: &str) -> &[String] {
        self.parameters
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Adds the file part `name`.
    pub fn add_file<N: Into<String>>(&mut self, name: N, part: FilePart) {
        self.files.insert(name.into(), part);
    }

    /// Replaces the session of the request.
    pub fn set_session(&mut self, session: Session) {
        self.session = session;
    }

    /// Every request attribute, in the order they were set.
    #[must_use]
    pub fn attributes(&self) -> &IndexMap<String, Value> {
        &self.attributes
    }
}

impl HostRequest for Request {
    fn parameter(&self, name: &str) -> Option<String> {
        self.parameters
            .get(name)
            .and_then(|values| values.first())
            .cloned()
    }

    fn parameter_keys(&self) -> Vec<String> {
        self.parameters.keys().cloned().collect()
    }

    fn file_part(&self, name: &str) -> Result<Option<FilePart>> {
        Ok(self.files.get(name).cloned())
    }

    fn session(&self) -> Session {
        self.session.clone()
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        self.attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, name: &str, value: Value) {
        self.attributes.insert(name.to_owned(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urlencoded_parameters_are_decoded() {
        let request = Request::from_urlencoded(b"user.name=Ann+Lee&user.email=a%40b.com");

        assert_eq!(request.parameter("user.name").as_deref(), Some("Ann Lee"));
        assert_eq!(request.parameter("user.email").as_deref(), Some("a@b.com"));
        assert_eq!(request.parameter("missing"), None);
    }

    #[test]
    fn empty_value_is_present() {
        let request = Request::from_urlencoded(b"name=");

        assert_eq!(request.parameter("name").as_deref(), Some(""));
    }

    #[test]
    fn attributes_and_files() {
        let mut request = Request::new();
        request.add_file("avatar", FilePart::new(Some("me.png"), &b"png"[..]));
        request.set_attribute("hasError", Value::Bool(true));

        assert_eq!(
            request.file_part("avatar").unwrap().unwrap().filename.as_deref(),
            Some("me.png")
        );
        assert_eq!(request.file_part("other").unwrap(), None);
        assert_eq!(request.attribute("hasError"), Some(Value::Bool(true)));
        assert_eq!(request.attributes().len(), 1);
    }

    #[test]
    fn session_is_shared() {
        let request = Request::new();

        request.session().add("auth", "admin").unwrap();

        assert_eq!(request.session().role("auth").as_deref(), Some("admin"));
    }
}
