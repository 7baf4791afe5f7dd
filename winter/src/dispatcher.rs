//! The front controller: the entry point of every request.
//!
//! A [`FrontController`] is initialized once, which scans the configured
//! package and builds the route registry. From then on, each request goes
//! through the same steps:
//!
//! 1. if initialization failed, the request is answered with a 500 response,
//! 2. the path is resolved in the registry (404 if unknown),
//! 3. the binding for the request verb is selected (405 if missing),
//! 4. the role found in the session is checked against the binding (403),
//! 5. the arguments are bound and the controller method is invoked,
//! 6. the returned value is classified into a [`DispatchOutcome`].

use std::error::Error as StdError;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use derive_more::with_trait::Debug;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::catalog::TypeSource;
use crate::config::WinterConfig;
use crate::error::{AccessDenied, InvalidReturnType, NotInitialized};
use crate::form::{ArgumentBinder, BindArguments};
use crate::request::HostRequest;
use crate::response::{DispatchOutcome, Forward, JsonString, ModelView, ResponseSink};
use crate::router::{Binding, RouteRegistry};
use crate::scanner::ControllerScanner;
use crate::{Error, RequestVerb, Result};

/// The request attribute set to `true` when binding produced errors.
pub const HAS_ERROR_ATTRIBUTE: &str = "hasError";

/// The request attribute holding the serialized
/// [`FormData`](crate::form::FormData) when binding produced errors.
pub const FORM_DATA_ATTRIBUTE: &str = "formData";

const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred";

#[derive(Debug)]
enum InitState {
    Uninitialized,
    Ready(RouteRegistry),
    Failed(Arc<Error>),
}

/// Resolves requests to controller methods and runs them.
///
/// # Examples
///
/// ```
/// use winter::catalog::TypeCatalog;
/// use winter::config::WinterConfig;
/// use winter::controller::{Controller, ControllerDeclaration};
/// use winter::response::DispatchOutcome;
/// use winter::test::TestRequestBuilder;
/// use winter::{FrontController, RequestVerb, StatusCode};
///
/// #[derive(Default)]
/// struct PingController;
///
/// impl Controller for PingController {
///     fn declare(controller: &mut ControllerDeclaration<Self>) {
///         controller.rest();
///         controller.method("ping", |_, _| Ok("pong".to_owned())).url("/ping");
///     }
/// }
///
/// let mut catalog = TypeCatalog::new();
/// catalog.register::<PingController>("app");
/// let mut front = FrontController::new(WinterConfig::default(), catalog);
/// front.initialize(Some("app"))?;
///
/// let mut request = TestRequestBuilder::get("/ping").build();
/// assert_eq!(
///     front.handle(RequestVerb::Get, "/ping", &mut request),
///     DispatchOutcome::RestBody(r#"{"value":"pong"}"#.to_owned())
/// );
/// assert_eq!(
///     front.handle(RequestVerb::Post, "/ping", &mut request).status(),
///     StatusCode::METHOD_NOT_ALLOWED
/// );
/// # Ok::<(), winter::Error>(())
/// ```
#[derive(Debug)]
pub struct FrontController {
    config: WinterConfig,
    #[debug("..")]
    source: Box<dyn TypeSource + Send + Sync>,
    state: InitState,
    #[debug("..")]
    binder: Arc<dyn BindArguments>,
}

impl FrontController {
    /// Creates an uninitialized front controller over the controllers of
    /// `source`.
    #[must_use]
    pub fn new<S: TypeSource + Send + Sync + 'static>(config: WinterConfig, source: S) -> Self {
        Self {
            config,
            source: Box::new(source),
            state: InitState::Uninitialized,
            binder: Arc::new(ArgumentBinder),
        }
    }

    /// Replaces the binder used to bind the arguments of every request.
    #[must_use]
    pub fn with_binder(mut self, binder: Arc<dyn BindArguments>) -> Self {
        self.binder = binder;
        self
    }

    /// Scans the package named in the configuration.
    ///
    /// # Errors
    ///
    /// See [`FrontController::initialize`].
    pub fn initialize_from_config(&mut self) -> Result<()> {
        let package = self.config.controllers_package.clone();
        self.initialize(package.as_deref())
    }

    /// Scans `package` and replaces the route registry with the result.
    ///
    /// Initializing again builds a new registry from scratch. When the scan
    /// fails, the error is kept and every request is answered with a 500
    /// response until a later initialization succeeds.
    ///
    /// # Errors
    ///
    /// Returns the scan error: a missing or malformed package name, or two
    /// methods mapped to the same path and verb.
    pub fn initialize(&mut self, package: Option<&str>) -> Result<()> {
        match ControllerScanner::new(&*self.source).scan(package) {
            Ok(registry) => {
                self.state = InitState::Ready(registry);
                Ok(())
            }
            Err(scan_error) => {
                error!(
                    error = %scan_error.chain_message(),
                    "failed to initialize the front controller"
                );
                let scan_error = Arc::new(scan_error);
                self.state = InitState::Failed(Arc::clone(&scan_error));
                Err(Error::wrap(InitializationFailed(scan_error)))
            }
        }
    }

    /// The configuration of the front controller.
    #[must_use]
    pub fn config(&self) -> &WinterConfig {
        &self.config
    }

    /// The route registry, once initialization succeeded.
    #[must_use]
    pub fn registry(&self) -> Option<&RouteRegistry> {
        match &self.state {
            InitState::Ready(registry) => Some(registry),
            _ => None,
        }
    }

    /// The error the last initialization failed with, if it did.
    #[must_use]
    pub fn init_error(&self) -> Option<&Error> {
        match &self.state {
            InitState::Failed(error) => Some(error.as_ref()),
            _ => None,
        }
    }

    /// Dispatches one request.
    ///
    /// Every failure is turned into a [`DispatchOutcome::ErrorResponse`].
    pub fn handle(
        &self,
        verb: RequestVerb,
        path: &str,
        request: &mut dyn HostRequest,
    ) -> DispatchOutcome {
        let registry = match &self.state {
            InitState::Ready(registry) => registry,
            InitState::Failed(init_error) => return self.error_outcome(init_error),
            InitState::Uninitialized => return self.error_outcome(&NotInitialized.into()),
        };

        match self.dispatch(registry, verb, path, request) {
            Ok(outcome) => outcome,
            Err(dispatch_error) => self.error_outcome(&dispatch_error),
        }
    }

    /// Dispatches one request and writes the outcome to `sink`.
    ///
    /// # Errors
    ///
    /// Returns an error if the outcome cannot be written.
    pub fn serve(
        &self,
        verb: RequestVerb,
        path: &str,
        request: &mut dyn HostRequest,
        sink: &mut dyn ResponseSink,
    ) -> Result<()> {
        self.handle(verb, path, request).write_to(sink)
    }

    fn dispatch(
        &self,
        registry: &RouteRegistry,
        verb: RequestVerb,
        path: &str,
        request: &mut dyn HostRequest,
    ) -> Result<DispatchOutcome> {
        let binding = registry.resolve(path)?.binding_for(verb)?;

        let session = request.session();
        let role = session.role(&self.config.auth_session_key);
        if !binding.is_authorized(role.as_deref()) {
            return Err(AccessDenied::new(role).into());
        }

        debug!(%verb, path, target = %binding, "dispatching request");
        let bound = self.binder.bind(binding.params(), request)?;
        let has_error = bound.has_error();
        if has_error {
            request.set_attribute(HAS_ERROR_ATTRIBUTE, Value::Bool(true));
            request.set_attribute(FORM_DATA_ATTRIBUTE, serde_json::to_value(&bound.form_data)?);
        }

        let value = binding.callable().call(bound.arguments, session)?;
        let value = match value.downcast::<String>() {
            Ok(text) => return string_outcome(binding, text),
            Err(value) => value,
        };
        match value.downcast::<ModelView>() {
            Ok(model_view) => {
                self.model_view_outcome(binding, verb, model_view, has_error, request)
            }
            Err(value) => Err(InvalidReturnType::new(value.type_name()).into()),
        }
    }

    fn model_view_outcome(
        &self,
        binding: &Binding,
        verb: RequestVerb,
        model_view: ModelView,
        has_error: bool,
        request: &mut dyn HostRequest,
    ) -> Result<DispatchOutcome> {
        model_view.copy_to(request);
        if let Some(error_view) = model_view.error_view() {
            request.set_attribute(
                &self.config.error_view_attribute,
                Value::String(error_view.to_owned()),
            );
        }

        if binding.is_rest() {
            return Ok(DispatchOutcome::RestBody(model_view.json_data()?));
        }

        let (view, method) = if has_error {
            let error_view = match request.attribute(&self.config.error_view_attribute) {
                Some(Value::String(view)) => view,
                _ => {
                    warn!(
                        attribute = %self.config.error_view_attribute,
                        view = model_view.view(),
                        "binding failed but no error view is set; rendering the target view"
                    );
                    model_view.view().to_owned()
                }
            };
            (error_view, RequestVerb::Get)
        } else {
            (model_view.view().to_owned(), verb)
        };

        let mut attributes = model_view.into_data();
        if has_error {
            for name in [HAS_ERROR_ATTRIBUTE, FORM_DATA_ATTRIBUTE] {
                if let Some(value) = request.attribute(name) {
                    attributes.insert(name.to_owned(), value);
                }
            }
        }

        Ok(DispatchOutcome::Rendered(Forward {
            view,
            method,
            attributes,
        }))
    }

    fn error_outcome(&self, error: &Error) -> DispatchOutcome {
        let status = error.status_code();
        let message = if status.is_server_error() {
            error!(
                status = status.as_u16(),
                error = %error.chain_message(),
                "internal error while dispatching a request"
            );
            if self.config.debug {
                error.chain_message()
            } else {
                GENERIC_ERROR_MESSAGE.to_owned()
            }
        } else {
            warn!(status = status.as_u16(), error = %error, "request could not be dispatched");
            error.to_string()
        };

        DispatchOutcome::ErrorResponse { status, message }
    }
}

fn string_outcome(binding: &Binding, text: String) -> Result<DispatchOutcome> {
    if binding.is_rest() {
        Ok(DispatchOutcome::RestBody(JsonString::new(text).to_json()?))
    } else {
        Ok(DispatchOutcome::RawBody(text))
    }
}

/// The error returned by [`FrontController::initialize`], sharing the scan
/// error kept for later requests.
#[derive(Debug)]
struct InitializationFailed(Arc<Error>);

impl Display for InitializationFailed {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&*self.0, f)
    }
}

impl StdError for InitializationFailed {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.0)
    }
}
