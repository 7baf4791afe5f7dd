//! Test utilities for Winter applications.

use mime::Mime;
use serde_json::Value;

use crate::config::DEFAULT_AUTH_SESSION_KEY;
use crate::request::{FilePart, Request};
use crate::response::{Forward, ResponseSink};
use crate::session::Session;
use crate::{RequestVerb, Result, StatusCode};

/// A builder for in-memory requests.
///
/// The query string of the URL, form data and file parts all end up as the
/// parameters and parts of the built [`Request`].
///
/// # Examples
///
/// ```
/// use winter::request::HostRequest;
/// use winter::test::TestRequestBuilder;
/// use winter::RequestVerb;
///
/// let mut builder = TestRequestBuilder::post("/users?page=2");
/// let request = builder
///     .form_data(&[("name", "Ann"), ("age", "30")])
///     .with_role("admin")
///     .build();
///
/// assert_eq!(builder.verb(), RequestVerb::Post);
/// assert_eq!(builder.path(), "/users");
/// assert_eq!(request.parameter("page").as_deref(), Some("2"));
/// assert_eq!(request.parameter("name").as_deref(), Some("Ann"));
/// assert_eq!(request.session().role("auth").as_deref(), Some("admin"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TestRequestBuilder {
    verb: RequestVerb,
    url: String,
    parameters: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    files: Vec<(String, FilePart)>,
    session: Option<Session>,
    session_attributes: Vec<(String, Value)>,
}

impl TestRequestBuilder {
    /// Create a new request builder for the given verb.
    #[must_use]
    pub fn new(verb: RequestVerb, url: &str) -> Self {
        Self {
            verb,
            url: url.to_owned(),
            ..Self::default()
        }
    }

    /// Create a new GET request builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use winter::test::TestRequestBuilder;
    ///
    /// let request = TestRequestBuilder::get("/").build();
    /// ```
    #[must_use]
    pub fn get(url: &str) -> Self {
        Self::new(RequestVerb::Get, url)
    }

    /// Create a new POST request builder.
    #[must_use]
    pub fn post(url: &str) -> Self {
        Self::new(RequestVerb::Post, url)
    }

    /// Create a new PUT request builder.
    #[must_use]
    pub fn put(url: &str) -> Self {
        Self::new(RequestVerb::Put, url)
    }

    /// Create a new DELETE request builder.
    #[must_use]
    pub fn delete(url: &str) -> Self {
        Self::new(RequestVerb::Delete, url)
    }

    /// The verb of the request.
    #[must_use]
    pub fn verb(&self) -> RequestVerb {
        self.verb
    }

    /// The path of the request, without its query string.
    #[must_use]
    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or_default()
    }

    /// Add a parameter value.
    pub fn param<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) -> &mut Self {
        self.parameters.push((name.into(), value.into()));
        self
    }

    /// Add several parameter values.
    pub fn form_data<T: ToString>(&mut self, form_data: &[(T, T)]) -> &mut Self {
        self.parameters.extend(
            form_data
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string())),
        );
        self
    }

    /// Set a form-encoded body, decoded into parameters.
    pub fn form_body<T: Into<Vec<u8>>>(&mut self, body: T) -> &mut Self {
        self.body = Some(body.into());
        self
    }

    /// Add a file part.
    pub fn file<N: Into<String>>(&mut self, name: N, part: FilePart) -> &mut Self {
        self.files.push((name.into(), part));
        self
    }

    /// Use the given session instead of a fresh in-memory one.
    pub fn session(&mut self, session: Session) -> &mut Self {
        self.session = Some(session);
        self
    }

    /// Store an attribute in the session of the request.
    pub fn session_attribute<T: Into<Value>>(&mut self, key: &str, value: T) -> &mut Self {
        self.session_attributes.push((key.to_owned(), value.into()));
        self
    }

    /// Store the caller's role under the default `"auth"` session key.
    pub fn with_role(&mut self, role: &str) -> &mut Self {
        self.session_attribute(DEFAULT_AUTH_SESSION_KEY, role)
    }

    /// Build the request.
    #[must_use]
    pub fn build(&mut self) -> Request {
        let mut request = Request::new();
        if let Some((_, query)) = self.url.split_once('?') {
            request.extend_urlencoded(query.as_bytes());
        }
        if let Some(body) = &self.body {
            request.extend_urlencoded(body);
        }
        for (name, value) in &self.parameters {
            request.add_parameter(name.clone(), value.clone());
        }
        for (name, part) in &self.files {
            request.add_file(name.clone(), part.clone());
        }

        let session = self.session.clone().unwrap_or_default();
        for (key, value) in &self.session_attributes {
            session.insert_value(key, value.clone());
        }
        request.set_session(session);
        request
    }
}

/// A [`ResponseSink`] recording everything written to it.
///
/// # Examples
///
/// ```
/// use winter::response::DispatchOutcome;
/// use winter::test::TestResponse;
/// use winter::StatusCode;
///
/// let mut response = TestResponse::new();
/// DispatchOutcome::RawBody("<p>hi</p>".to_owned()).write_to(&mut response)?;
///
/// assert_eq!(response.status(), Some(StatusCode::OK));
/// assert_eq!(response.body(), "<p>hi</p>");
/// # Ok::<(), winter::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct TestResponse {
    status: Option<StatusCode>,
    content_type: Option<Mime>,
    body: String,
    forwarded: Option<Forward>,
}

impl TestResponse {
    /// Creates an empty response.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The status that was set, if any.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// The content type of the body, if one was written.
    #[must_use]
    pub fn content_type(&self) -> Option<&Mime> {
        self.content_type.as_ref()
    }

    /// Everything written to the body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// The forward that was requested, if any.
    #[must_use]
    pub fn forwarded(&self) -> Option<&Forward> {
        self.forwarded.as_ref()
    }
}

impl ResponseSink for TestResponse {
    fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    fn write_body(&mut self, content: &str, content_type: &Mime) -> Result<()> {
        self.content_type = Some(content_type.clone());
        self.body.push_str(content);
        Ok(())
    }

    fn forward_to(&mut self, forward: &Forward) -> Result<()> {
        self.forwarded = Some(forward.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::HostRequest;

    #[test]
    fn builder_collects_parameters() {
        let request = TestRequestBuilder::put("/items?id=3")
            .form_body("name=Lamp&tags=a")
            .param("tags", "b")
            .build();

        assert_eq!(request.parameter("id").as_deref(), Some("3"));
        assert_eq!(request.parameter("name").as_deref(), Some("Lamp"));
        assert_eq!(request.parameter_values("tags"), ["a", "b"]);
    }

    #[test]
    fn builder_shares_given_session() {
        let session = Session::in_memory();

        let request = TestRequestBuilder::delete("/items")
            .session(session.clone())
            .session_attribute("auth", "manager")
            .build();

        assert_eq!(session.role("auth").as_deref(), Some("manager"));
        assert_eq!(request.session().role("auth").as_deref(), Some("manager"));
    }

    #[test]
    fn path_drops_query() {
        let builder = TestRequestBuilder::get("/search?q=x");

        assert_eq!(builder.path(), "/search");
        assert_eq!(builder.verb(), RequestVerb::Get);
    }
}
