//! Controller declarations and the uniform invocation entry point.
//!
//! A controller is a type implementing [`Controller`]. Instead of carrying
//! annotations that are discovered at runtime, it describes itself in
//! [`Controller::declare`]: which URL prefix it lives under, whether its
//! methods answer with raw data (REST) or views, which roles may call them,
//! and for each method its URL, verb and parameters together with the
//! closure that runs it.
//!
//! The declaration is collected once into a [`ControllerMetadata`] value,
//! which is what the [`scanner`](crate::scanner) reads to build the route
//! registry.
//!
//! # Examples
//!
//! ```
//! use winter::controller::{Arguments, Controller, ControllerDeclaration, ControllerMetadata};
//! use winter::form::ParamDescriptor;
//! use winter::response::ModelView;
//!
//! #[derive(Default)]
//! struct UserController;
//!
//! impl Controller for UserController {
//!     fn declare(controller: &mut ControllerDeclaration<Self>) {
//!         controller.url_prefix("/users").auth(["admin"]);
//!         controller
//!             .method("show", |_, mut args: Arguments| {
//!                 let id: i64 = args.get(0)?;
//!                 let mut view = ModelView::new("user.jsp");
//!                 view.add_object("id", &id)?;
//!                 Ok(view)
//!             })
//!             .url("/show")
//!             .param(ParamDescriptor::scalar::<i64>("id").required());
//!     }
//! }
//!
//! let metadata = ControllerMetadata::of::<UserController>();
//! assert_eq!(metadata.name(), "UserController");
//! assert_eq!(metadata.methods().len(), 1);
//! ```

use std::any::{Any, TypeId};
use std::marker::PhantomData;
use std::sync::Arc;

use derive_more::with_trait::Debug;

use crate::error::ArgumentMismatch;
use crate::form::ParamDescriptor;
use crate::session::Session;
use crate::{RequestVerb, Result};

/// A type whose methods can be routed to.
///
/// A fresh instance is created with [`Default`] for every invocation, so
/// controllers should not keep state between requests.
pub trait Controller: Default + Send + 'static {
    /// Declares the routing metadata and the methods of this controller.
    fn declare(controller: &mut ControllerDeclaration<Self>);

    /// Hands the caller's session to a freshly created instance, before the
    /// method is invoked.
    ///
    /// The default implementation drops the session.
    fn set_session(&mut self, session: Session) {
        let _ = session;
    }

    /// The simple name of the controller, as found in catalog listings.
    ///
    /// Defaults to the last path segment of the type name.
    #[must_use]
    fn name() -> &'static str {
        let type_name = std::any::type_name::<Self>();
        let base = type_name.split('<').next().unwrap_or(type_name);
        base.rsplit("::").next().unwrap_or(base)
    }
}

/// The metadata of a controller type: its type-level markers and its
/// declared methods.
#[derive(Debug, Clone)]
pub struct ControllerMetadata {
    type_id: TypeId,
    type_name: &'static str,
    name: &'static str,
    url_prefix: Option<String>,
    rest: bool,
    auth_roles: Vec<String>,
    methods: Vec<MethodMetadata>,
}

impl ControllerMetadata {
    /// Collects the metadata of the controller `C` by running its
    /// [`Controller::declare`] function.
    #[must_use]
    pub fn of<C: Controller>() -> Self {
        let mut declaration = ControllerDeclaration::<C> {
            metadata: Self {
                type_id: TypeId::of::<C>(),
                type_name: std::any::type_name::<C>(),
                name: C::name(),
                url_prefix: None,
                rest: false,
                auth_roles: Vec::new(),
                methods: Vec::new(),
            },
            _controller: PhantomData,
        };
        C::declare(&mut declaration);
        declaration.metadata
    }

    /// The [`TypeId`] of the controller type.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The full Rust type name of the controller.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The simple name of the controller.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The URL prefix shared by every method of the controller.
    #[must_use]
    pub fn url_prefix(&self) -> Option<&str> {
        self.url_prefix.as_deref()
    }

    /// Whether every method of the controller is a REST method.
    #[must_use]
    pub fn is_rest(&self) -> bool {
        self.rest
    }

    /// The roles allowed to call any method of the controller.
    #[must_use]
    pub fn auth_roles(&self) -> &[String] {
        &self.auth_roles
    }

    /// The declared methods, in declaration order.
    #[must_use]
    pub fn methods(&self) -> &[MethodMetadata] {
        &self.methods
    }
}

/// The builder passed to [`Controller::declare`].
#[derive(Debug)]
pub struct ControllerDeclaration<C> {
    metadata: ControllerMetadata,
    #[debug(skip)]
    _controller: PhantomData<fn() -> C>,
}

impl<C: Controller> ControllerDeclaration<C> {
    /// Sets the URL prefix prepended to the URL of every method.
    pub fn url_prefix<T: Into<String>>(&mut self, prefix: T) -> &mut Self {
        self.metadata.url_prefix = Some(prefix.into());
        self
    }

    /// Marks every method of the controller as a REST method.
    pub fn rest(&mut self) -> &mut Self {
        self.metadata.rest = true;
        self
    }

    /// Adds roles allowed to call any method of the controller.
    pub fn auth<I, S>(&mut self, roles: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metadata
            .auth_roles
            .extend(roles.into_iter().map(Into::into));
        self
    }

    /// Declares a method of the controller.
    ///
    /// The method is only routed to once it has been given a URL with
    /// [`MethodMetadata::url`]. The handler receives a fresh controller
    /// instance and the arguments bound from the request, in the order of
    /// the declared parameters.
    pub fn method<F, R>(&mut self, name: &str, handler: F) -> &mut MethodMetadata
    where
        F: Fn(&mut C, Arguments) -> Result<R> + Send + Sync + 'static,
        R: Any + Send,
    {
        self.metadata.methods.push(MethodMetadata {
            name: name.to_owned(),
            url: None,
            verb: RequestVerb::default(),
            rest: false,
            auth_roles: Vec::new(),
            params: Vec::new(),
            callable: Arc::new(MethodCallable {
                handler,
                _marker: PhantomData,
            }),
        });
        let index = self.metadata.methods.len() - 1;
        &mut self.metadata.methods[index]
    }
}

/// The metadata of a single controller method.
#[derive(Debug, Clone)]
pub struct MethodMetadata {
    name: String,
    url: Option<String>,
    verb: RequestVerb,
    rest: bool,
    auth_roles: Vec<String>,
    params: Vec<ParamDescriptor>,
    #[debug("..")]
    callable: Arc<dyn Callable>,
}

impl MethodMetadata {
    /// Sets the URL of the method, relative to the controller prefix.
    pub fn url<T: Into<String>>(&mut self, url: T) -> &mut Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the verb the method answers to. The default is
    /// [`RequestVerb::Get`].
    pub fn verb(&mut self, verb: RequestVerb) -> &mut Self {
        self.verb = verb;
        self
    }

    /// Shorthand for `verb(RequestVerb::Get)`.
    pub fn get(&mut self) -> &mut Self {
        self.verb(RequestVerb::Get)
    }

    /// Shorthand for `verb(RequestVerb::Post)`.
    pub fn post(&mut self) -> &mut Self {
        self.verb(RequestVerb::Post)
    }

    /// Shorthand for `verb(RequestVerb::Put)`.
    pub fn put(&mut self) -> &mut Self {
        self.verb(RequestVerb::Put)
    }

    /// Shorthand for `verb(RequestVerb::Delete)`.
    pub fn delete(&mut self) -> &mut Self {
        self.verb(RequestVerb::Delete)
    }

    /// Marks the method as a REST method.
    pub fn rest(&mut self) -> &mut Self {
        self.rest = true;
        self
    }

    /// Adds roles allowed to call this method, on top of the roles declared
    /// by the controller.
    pub fn auth<I, S>(&mut self, roles: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.auth_roles.extend(roles.into_iter().map(Into::into));
        self
    }

    /// Appends a parameter. Parameters are bound in declaration order.
    pub fn param(&mut self, param: ParamDescriptor) -> &mut Self {
        self.params.push(param);
        self
    }

    /// The name of the method.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The URL of the method, if it is routed.
    #[must_use]
    pub fn url_mapping(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// The verb of the method.
    #[must_use]
    pub fn request_verb(&self) -> RequestVerb {
        self.verb
    }

    /// Whether the method itself is marked as REST.
    #[must_use]
    pub fn is_rest(&self) -> bool {
        self.rest
    }

    /// The roles declared on the method itself.
    #[must_use]
    pub fn auth_roles(&self) -> &[String] {
        &self.auth_roles
    }

    /// The declared parameters.
    #[must_use]
    pub fn params(&self) -> &[ParamDescriptor] {
        &self.params
    }

    /// The invocation entry point of the method.
    #[must_use]
    pub fn callable(&self) -> Arc<dyn Callable> {
        Arc::clone(&self.callable)
    }
}

/// The uniform invocation entry point of a controller method.
pub trait Callable: Send + Sync {
    /// Instantiates the controller, hands it the session and runs the
    /// method with the given arguments.
    ///
    /// # Errors
    ///
    /// Returns whatever error the method returns.
    fn call(&self, arguments: Arguments, session: Session) -> Result<ReturnValue>;
}

struct MethodCallable<C, F, R> {
    handler: F,
    _marker: PhantomData<fn() -> (C, R)>,
}

impl<C, F, R> Callable for MethodCallable<C, F, R>
where
    C: Controller,
    F: Fn(&mut C, Arguments) -> Result<R> + Send + Sync + 'static,
    R: Any + Send,
{
    fn call(&self, arguments: Arguments, session: Session) -> Result<ReturnValue> {
        let mut controller = C::default();
        controller.set_session(session);
        let value = (self.handler)(&mut controller, arguments)?;
        Ok(ReturnValue::new(value))
    }
}

/// The value returned by a controller method, with its type erased.
#[derive(Debug)]
pub struct ReturnValue {
    #[debug("..")]
    value: Box<dyn Any + Send>,
    type_name: &'static str,
}

impl ReturnValue {
    /// Wraps a returned value.
    #[must_use]
    pub fn new<T: Any + Send>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// The Rust type name of the returned value.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the value if it is a `T`, or gives `self` back otherwise.
    ///
    /// # Errors
    ///
    /// Returns `self` unchanged if the value is not a `T`.
    pub fn downcast<T: Any>(self) -> std::result::Result<T, Self> {
        match self.value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => Err(Self {
                value,
                type_name: self.type_name,
            }),
        }
    }
}

#[derive(Debug)]
enum Slot {
    Null,
    Value(Box<dyn Any + Send>, &'static str),
    Taken,
}

/// The arguments bound from a request, in the order of the declared
/// parameters.
///
/// Each argument is taken out by its position with the type it was declared
/// with: [`ParamDescriptor::scalar::<T>`](ParamDescriptor::scalar) and
/// [`ParamDescriptor::object::<T>`](ParamDescriptor::object) produce a `T`,
/// [`ParamDescriptor::file`] produces an
/// [`UploadedFile`](crate::form::UploadedFile).
#[derive(Debug, Default)]
pub struct Arguments {
    slots: Vec<Slot>,
}

impl Arguments {
    /// Creates an empty argument list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a bound value.
    pub fn push<T: Any + Send>(&mut self, value: T) {
        self.slots
            .push(Slot::Value(Box::new(value), std::any::type_name::<T>()));
    }

    /// Appends a null argument, for a parameter with no value in the
    /// request.
    pub fn push_null(&mut self) {
        self.slots.push(Slot::Null);
    }

    pub(crate) fn push_boxed(&mut self, (value, type_name): (Box<dyn Any + Send>, &'static str)) {
        self.slots.push(Slot::Value(value, type_name));
    }

    /// The number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether the argument at `index` is null.
    #[must_use]
    pub fn is_null(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Slot::Null))
    }

    /// Takes the argument at `index`.
    ///
    /// # Errors
    ///
    /// Returns an [`ArgumentMismatch`] error if there is no argument at this
    /// position, if it was already taken, if it is null, or if it is not a
    /// `T`.
    pub fn get<T: Any>(&mut self, index: usize) -> Result<T> {
        self.optional(index)?
            .ok_or_else(|| ArgumentMismatch::Null { index }.into())
    }

    /// Takes the argument at `index`, mapping null to `None`.
    ///
    /// # Errors
    ///
    /// Returns an [`ArgumentMismatch`] error if there is no argument at this
    /// position, if it was already taken, or if it is not a `T`.
    pub fn optional<T: Any>(&mut self, index: usize) -> Result<Option<T>> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(ArgumentMismatch::OutOfRange { index })?;
        match std::mem::replace(slot, Slot::Taken) {
            Slot::Null => {
                *slot = Slot::Null;
                Ok(None)
            }
            Slot::Taken => Err(ArgumentMismatch::AlreadyTaken { index }.into()),
            Slot::Value(value, type_name) => match value.downcast::<T>() {
                Ok(value) => Ok(Some(*value)),
                Err(value) => {
                    *slot = Slot::Value(value, type_name);
                    Err(ArgumentMismatch::WrongType {
                        index,
                        expected: std::any::type_name::<T>(),
                    }
                    .into())
                }
            },
        }
    }
}
