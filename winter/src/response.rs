//! Controller results and dispatch outcomes.
//!
//! A controller method returns either a `String` or a [`ModelView`]. The
//! dispatcher classifies that result into a [`DispatchOutcome`], which the
//! host applies to its response through a [`ResponseSink`].

use indexmap::IndexMap;
use mime::Mime;
use serde::Serialize;
use serde_json::Value;

use crate::error_page::render_error_page;
use crate::request::HostRequest;
use crate::{RequestVerb, Result, StatusCode};

/// The default name of the request attribute holding the view rendered when
/// binding failed.
pub const ERROR_VIEW_ATTRIBUTE: &str = "errorUrl";

/// A view identifier paired with the attributes it is rendered with.
///
/// # Examples
///
/// ```
/// use winter::response::ModelView;
///
/// let mut view = ModelView::new("users/list.jsp");
/// view.add_object("count", &3)?.add_object("title", "Users")?;
///
/// assert_eq!(view.view(), "users/list.jsp");
/// assert_eq!(view.json_data()?, r#"{"count":3,"title":"Users"}"#);
/// # Ok::<(), winter::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelView {
    view: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_view: Option<String>,
    data: IndexMap<String, Value>,
}

impl ModelView {
    /// Creates a model view targeting `view`, with no attributes.
    #[must_use]
    pub fn new<T: Into<String>>(view: T) -> Self {
        Self {
            view: view.into(),
            error_view: None,
            data: IndexMap::new(),
        }
    }

    /// The identifier of the target view.
    #[must_use]
    pub fn view(&self) -> &str {
        &self.view
    }

    /// Changes the target view.
    pub fn set_view<T: Into<String>>(&mut self, view: T) {
        self.view = view.into();
    }

    /// Serializes `value` and adds it as the attribute `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized.
    pub fn add_object<T: Serialize + ?Sized>(
        &mut self,
        name: &str,
        value: &T,
    ) -> Result<&mut Self> {
        self.data.insert(name.to_owned(), serde_json::to_value(value)?);
        Ok(self)
    }

    /// Sets the view rendered instead of the target view when the arguments
    /// of the request could not be bound.
    ///
    /// The dispatcher exposes it to the request under the configured
    /// [`error_view_attribute`](crate::config::WinterConfig::error_view_attribute),
    /// so it never mixes with the attributes of the model.
    #[must_use]
    pub fn with_error_view<T: Into<String>>(mut self, view: T) -> Self {
        self.error_view = Some(view.into());
        self
    }

    /// The view rendered when binding failed, if one was set.
    #[must_use]
    pub fn error_view(&self) -> Option<&str> {
        self.error_view.as_deref()
    }

    /// The attribute `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// Every attribute, in insertion order.
    #[must_use]
    pub fn data(&self) -> &IndexMap<String, Value> {
        &self.data
    }

    /// The attributes serialized as a JSON object.
    ///
    /// # Errors
    ///
    /// Returns an error if the attributes cannot be serialized.
    pub fn json_data(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.data)?)
    }

    /// Copies every attribute onto the request.
    pub fn copy_to(&self, request: &mut dyn HostRequest) {
        for (name, value) in &self.data {
            request.set_attribute(name, value.clone());
        }
    }

    pub(crate) fn into_data(self) -> IndexMap<String, Value> {
        self.data
    }
}

/// The JSON envelope of a string returned by a REST method.
///
/// # Examples
///
/// ```
/// use winter::response::JsonString;
///
/// let body = JsonString::new("done").to_json()?;
/// assert_eq!(body, r#"{"value":"done"}"#);
/// # Ok::<(), winter::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsonString {
    /// The returned string.
    pub value: String,
}

impl JsonString {
    /// Wraps a string.
    #[must_use]
    pub fn new<T: Into<String>>(value: T) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Serializes the envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A forward to a view, rendered by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct Forward {
    /// The identifier of the view.
    pub view: String,
    /// The method the view sees the request with. Always
    /// [`RequestVerb::Get`] when re-rendering after a binding failure.
    pub method: RequestVerb,
    /// The attributes set on the request for the view.
    pub attributes: IndexMap<String, Value>,
}

/// The outcome of dispatching one request.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Render a view.
    Rendered(Forward),
    /// A JSON body, for REST methods.
    RestBody(String),
    /// An HTML body returned as-is.
    RawBody(String),
    /// An error response.
    ErrorResponse {
        /// The status of the response.
        status: StatusCode,
        /// The message shown to the caller.
        message: String,
    },
}

impl DispatchOutcome {
    /// The status of the response.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::ErrorResponse { status, .. } => *status,
            _ => StatusCode::OK,
        }
    }

    /// Whether the outcome is an error response.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::ErrorResponse { .. })
    }

    /// The view identifier, if the outcome renders a view.
    #[must_use]
    pub fn view(&self) -> Option<&str> {
        match self {
            Self::Rendered(forward) => Some(&forward.view),
            _ => None,
        }
    }

    /// Applies the outcome to the host response.
    ///
    /// REST bodies are written as `application/json`. Raw bodies and error
    /// pages are written as `text/html`.
    ///
    /// # Errors
    ///
    /// Returns an error if the error page cannot be rendered or if the sink
    /// fails.
    pub fn write_to(&self, sink: &mut dyn ResponseSink) -> Result<()> {
        match self {
            Self::Rendered(forward) => {
                sink.set_status(StatusCode::OK);
                sink.forward_to(forward)
            }
            Self::RestBody(body) => {
                sink.set_status(StatusCode::OK);
                sink.write_body(body, &mime::APPLICATION_JSON)
            }
            Self::RawBody(body) => {
                sink.set_status(StatusCode::OK);
                sink.write_body(body, &mime::TEXT_HTML_UTF_8)
            }
            Self::ErrorResponse { status, message } => {
                let page = render_error_page(*status, message)?;
                sink.set_status(*status);
                sink.write_body(&page, &mime::TEXT_HTML_UTF_8)
            }
        }
    }
}

/// The response surface the host provides.
pub trait ResponseSink {
    /// Sets the status of the response.
    fn set_status(&mut self, status: StatusCode);

    /// Writes the body of the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be written.
    fn write_body(&mut self, content: &str, content_type: &Mime) -> Result<()>;

    /// Hands the request over to the view renderer.
    ///
    /// # Errors
    ///
    /// Returns an error if the view cannot be rendered.
    fn forward_to(&mut self, forward: &Forward) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Request;
    use crate::test::TestResponse;

    #[test]
    fn model_view_attributes() {
        let mut view = ModelView::new("users.jsp").with_error_view("form.jsp");
        view.add_object("names", &["Ann", "Bob"]).unwrap();

        assert_eq!(view.error_view(), Some("form.jsp"));
        assert_eq!(view.get(ERROR_VIEW_ATTRIBUTE), None);
        assert_eq!(view.get("names"), Some(&serde_json::json!(["Ann", "Bob"])));
        assert_eq!(view.data().len(), 1);
        assert_eq!(view.json_data().unwrap(), r#"{"names":["Ann","Bob"]}"#);

        view.set_view("other.jsp");
        assert_eq!(view.view(), "other.jsp");
    }

    #[test]
    fn model_view_copies_to_request() {
        let mut view = ModelView::new("users.jsp");
        view.add_object("count", &2).unwrap();
        let mut request = Request::new();

        view.copy_to(&mut request);

        assert_eq!(request.attribute("count"), Some(Value::from(2)));
    }

    #[test]
    fn write_rest_body() {
        let mut response = TestResponse::new();

        DispatchOutcome::RestBody(r#"{"value":"x"}"#.to_owned())
            .write_to(&mut response)
            .unwrap();

        assert_eq!(response.status(), Some(StatusCode::OK));
        assert_eq!(response.content_type(), Some(&mime::APPLICATION_JSON));
        assert_eq!(response.body(), r#"{"value":"x"}"#);
    }

    #[test]
    fn write_forward() {
        let forward = Forward {
            view: "home.jsp".to_owned(),
            method: RequestVerb::Get,
            attributes: IndexMap::new(),
        };
        let mut response = TestResponse::new();

        DispatchOutcome::Rendered(forward.clone())
            .write_to(&mut response)
            .unwrap();

        assert_eq!(response.forwarded(), Some(&forward));
        assert_eq!(response.body(), "");
    }

    #[test]
    fn write_error_page() {
        let outcome = DispatchOutcome::ErrorResponse {
            status: StatusCode::METHOD_NOT_ALLOWED,
            message: "method `GET` not allowed for the URL: /users".to_owned(),
        };
        let mut response = TestResponse::new();

        outcome.write_to(&mut response).unwrap();

        assert!(outcome.is_error());
        assert_eq!(outcome.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.status(), Some(StatusCode::METHOD_NOT_ALLOWED));
        assert_eq!(response.content_type(), Some(&mime::TEXT_HTML_UTF_8));
        assert!(response.body().contains("405 - Method Not Allowed"));
    }
}
