//! Winter is a request-routing and controller-invocation engine.
//!
//! Controllers declare their routes explicitly instead of relying on runtime
//! reflection: each controller type implements [`Controller`] and describes
//! its URL prefix, its methods, their verbs, authorization roles and request
//! parameters in [`Controller::declare`]. A [`catalog::TypeCatalog`] groups
//! controllers into dotted namespaces, the [`scanner::ControllerScanner`]
//! turns a namespace into a [`router::RouteRegistry`], and the
//! [`dispatcher::FrontController`] resolves each request to a binding, binds
//! its arguments from the request, invokes it and classifies the result.
//!
//! The HTTP transport, sessions storage and view rendering belong to the
//! host. They are reached through the [`request::HostRequest`],
//! [`session::SessionStore`] and [`response::ResponseSink`] traits.
//!
//! # Examples
//!
//! ```
//! use winter::controller::{Arguments, Controller, ControllerDeclaration};
//! use winter::dispatcher::FrontController;
//! use winter::catalog::TypeCatalog;
//! use winter::config::WinterConfig;
//! use winter::form::ParamDescriptor;
//! use winter::response::DispatchOutcome;
//! use winter::test::TestRequestBuilder;
//! use winter::RequestVerb;
//!
//! #[derive(Default)]
//! struct HelloController;
//!
//! impl Controller for HelloController {
//!     fn declare(controller: &mut ControllerDeclaration<Self>) {
//!         controller.url_prefix("/hello");
//!         controller
//!             .method("greet", |_, mut args: Arguments| {
//!                 let name: String = args.get(0)?;
//!                 Ok(format!("Hello, {name}!"))
//!             })
//!             .url("/greet")
//!             .param(ParamDescriptor::scalar::<String>("name"));
//!     }
//! }
//!
//! let mut catalog = TypeCatalog::new();
//! catalog.register::<HelloController>("app.controllers");
//!
//! let config = WinterConfig::builder()
//!     .controllers_package("app.controllers")
//!     .build();
//! let mut front = FrontController::new(config, catalog);
//! front.initialize_from_config()?;
//!
//! let mut request = TestRequestBuilder::get("/hello/greet").param("name", "Ann").build();
//! let outcome = front.handle(RequestVerb::Get, "/hello/greet", &mut request);
//! assert_eq!(outcome, DispatchOutcome::RawBody("Hello, Ann!".to_owned()));
//! # Ok::<(), winter::Error>(())
//! ```

#![warn(missing_docs, rustdoc::missing_crate_level_docs)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

extern crate self as winter;

pub mod catalog;
pub mod config;
pub mod controller;
pub mod dispatcher;
pub mod error;
mod error_page;
pub mod form;
// Not public API. Referenced by macro-generated code.
#[doc(hidden)]
#[path = "private.rs"]
pub mod __private;
pub mod request;
pub mod response;
pub mod router;
pub mod scanner;
pub mod session;
pub mod test;
mod verb;

pub use error::Error;
pub use verb::{RequestVerb, UnsupportedVerb};
pub use winter_macros::BindObject;
pub use {bytes, http};

pub use crate::controller::Controller;
pub use crate::dispatcher::FrontController;

/// A type alias for a result that can return a [`winter::Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// A type alias for an HTTP status code.
pub type StatusCode = http::StatusCode;
