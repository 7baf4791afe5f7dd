//! Discovery of controllers and construction of the route registry.
//!
//! The [`ControllerScanner`] walks a namespace of a [`TypeSource`] and every
//! namespace nested in it. Each controller it meets contributes one
//! [`Binding`] per routed method:
//!
//! - the path is the controller's URL prefix followed by the method URL,
//! - the verb is the method verb,
//! - the binding is REST if either the controller or the method is,
//! - the allowed roles are the controller roles plus the method roles.
//!
//! # Examples
//!
//! ```
//! use winter::catalog::TypeCatalog;
//! use winter::controller::{Controller, ControllerDeclaration};
//! use winter::scanner::ControllerScanner;
//! use winter::RequestVerb;
//!
//! #[derive(Default)]
//! struct UserController;
//!
//! impl Controller for UserController {
//!     fn declare(controller: &mut ControllerDeclaration<Self>) {
//!         controller.url_prefix("/users");
//!         controller.method("create", |_, _| Ok("ok".to_owned())).url("/new").post();
//!     }
//! }
//!
//! let mut catalog = TypeCatalog::new();
//! catalog.register::<UserController>("app.controllers.admin");
//!
//! let registry = ControllerScanner::new(&catalog).scan(Some("app.controllers"))?;
//! let binding = registry.resolve("/users/new")?.binding_for(RequestVerb::Post)?;
//! assert_eq!(binding.handler_type(), "app.controllers.admin.UserController");
//! # Ok::<(), winter::Error>(())
//! ```

use std::collections::BTreeSet;
use std::sync::LazyLock;

use derive_more::with_trait::Debug;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::Result;
use crate::catalog::TypeSource;
use crate::controller::ControllerMetadata;
use crate::error::{InvalidPackageName, PackageProviderNotFound};
use crate::router::{Binding, RouteRegistry};

static PACKAGE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+(\.\w+)*$").expect("package name pattern is valid"));

/// Builds a [`RouteRegistry`] out of the controllers of a [`TypeSource`].
#[derive(Debug, Clone, Copy)]
pub struct ControllerScanner<'a> {
    #[debug("..")]
    source: &'a dyn TypeSource,
}

impl<'a> ControllerScanner<'a> {
    /// Creates a scanner over `source`.
    #[must_use]
    pub fn new(source: &'a dyn TypeSource) -> Self {
        Self { source }
    }

    /// Scans `package` and every namespace below it.
    ///
    /// A package that is not part of the source yields an empty registry.
    ///
    /// # Errors
    ///
    /// Returns [`PackageProviderNotFound`] if `package` is `None`,
    /// [`InvalidPackageName`] if it is not a dotted identifier, and
    /// [`DuplicateMapping`](crate::error::DuplicateMapping) if two methods
    /// map to the same path and verb.
    pub fn scan(&self, package: Option<&str>) -> Result<RouteRegistry> {
        let package = package.ok_or(PackageProviderNotFound)?;
        validate_package_name(package)?;

        let mut registry = RouteRegistry::new();
        if self.source.enumerate_types(package).is_none() {
            warn!(package, "the controllers package does not exist; no route registered");
            return Ok(registry);
        }

        let mut current = package.to_owned();
        self.scan_namespace(&mut current, &mut registry)?;

        info!(
            package,
            paths = registry.len(),
            bindings = registry.binding_count(),
            "controllers scanned"
        );
        Ok(registry)
    }

    /// Registers the controllers of `namespace`, then descends into its
    /// children. `namespace` is restored before returning.
    fn scan_namespace(&self, namespace: &mut String, registry: &mut RouteRegistry) -> Result<()> {
        let Some(listing) = self.source.enumerate_types(namespace) else {
            return Ok(());
        };

        for type_name in &listing.types {
            let type_id = format!("{namespace}.{type_name}");
            if let Some(metadata) = self.source.controller_metadata(&type_id) {
                register_controller(&type_id, metadata, registry)?;
            }
        }

        for child in &listing.namespaces {
            let parent_len = namespace.len();
            namespace.push('.');
            namespace.push_str(child);
            let result = self.scan_namespace(namespace, registry);
            namespace.truncate(parent_len);
            result?;
        }
        Ok(())
    }
}

fn validate_package_name(package: &str) -> Result<()> {
    if PACKAGE_NAME.is_match(package) {
        Ok(())
    } else {
        Err(InvalidPackageName::new(package).into())
    }
}

fn register_controller(
    type_id: &str,
    metadata: &ControllerMetadata,
    registry: &mut RouteRegistry,
) -> Result<()> {
    debug!(controller = type_id, "scanning controller");
    let prefix = metadata.url_prefix().unwrap_or_default();

    for method in metadata.methods() {
        let Some(url) = method.url_mapping() else {
            continue;
        };
        let roles: BTreeSet<String> = metadata
            .auth_roles()
            .iter()
            .chain(method.auth_roles())
            .map(|role| role.trim())
            .filter(|role| !role.is_empty())
            .map(ToOwned::to_owned)
            .collect();
        let rest = metadata.is_rest() || method.is_rest();

        registry.register(
            &format!("{prefix}{url}"),
            Binding::new(type_id, method, rest, roles),
        )?;
    }
    Ok(())
}
