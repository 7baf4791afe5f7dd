//! The route registry: normalized paths mapped to verb-specific bindings.
//!
//! The registry is built once at startup by the
//! [`scanner`](crate::scanner) and only read afterwards. Lookups are exact
//! matches on the normalized path.
//!
//! # Examples
//!
//! ```
//! use std::collections::BTreeSet;
//!
//! use winter::controller::ControllerMetadata;
//! use winter::router::{Binding, RouteRegistry};
//! use winter::RequestVerb;
//! # use winter::controller::{Controller, ControllerDeclaration};
//! # #[derive(Default)]
//! # struct UserController;
//! # impl Controller for UserController {
//! #     fn declare(controller: &mut ControllerDeclaration<Self>) {
//! #         controller.method("list", |_, _| Ok("users".to_owned())).url("/users");
//! #     }
//! # }
//!
//! let metadata = ControllerMetadata::of::<UserController>();
//! let method = &metadata.methods()[0];
//!
//! let mut registry = RouteRegistry::new();
//! registry.register(
//!     "/users/",
//!     Binding::new("app.UserController", method, false, BTreeSet::new()),
//! )?;
//!
//! let entry = registry.resolve("/users")?;
//! assert_eq!(entry.binding_for(RequestVerb::Get)?.method_name(), "list");
//! assert!(entry.binding_for(RequestVerb::Post).is_err());
//! # Ok::<(), winter::Error>(())
//! ```

use std::collections::{BTreeSet, HashMap};
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use derive_more::with_trait::Debug;
use tracing::debug;

use crate::controller::{Callable, MethodMetadata};
use crate::error::{DuplicateMapping, MethodNotAllowed, NotFound};
use crate::form::ParamDescriptor;
use crate::{RequestVerb, Result};

/// A verb-specific executable target attached to a route.
#[derive(Debug, Clone)]
pub struct Binding {
    method_name: String,
    handler_type: String,
    verb: RequestVerb,
    rest: bool,
    auth_roles: BTreeSet<String>,
    params: Arc<[ParamDescriptor]>,
    #[debug("..")]
    callable: Arc<dyn Callable>,
}

impl Binding {
    /// Creates a binding for `method` of the controller `handler_type`.
    ///
    /// `rest` and `auth_roles` are the effective values, combining the
    /// markers of the controller with those of the method.
    #[must_use]
    pub fn new<T: Into<String>>(
        handler_type: T,
        method: &MethodMetadata,
        rest: bool,
        auth_roles: BTreeSet<String>,
    ) -> Self {
        Self {
            method_name: method.name().to_owned(),
            handler_type: handler_type.into(),
            verb: method.request_verb(),
            rest,
            auth_roles,
            params: method.params().into(),
            callable: method.callable(),
        }
    }

    /// The name of the controller method.
    #[must_use]
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// The qualified name of the controller type.
    #[must_use]
    pub fn handler_type(&self) -> &str {
        &self.handler_type
    }

    /// The verb of the binding.
    #[must_use]
    pub fn verb(&self) -> RequestVerb {
        self.verb
    }

    /// Whether the result is sent as data instead of rendered as a view.
    #[must_use]
    pub fn is_rest(&self) -> bool {
        self.rest
    }

    /// The roles allowed to call the binding. Empty means no restriction.
    #[must_use]
    pub fn auth_roles(&self) -> &BTreeSet<String> {
        &self.auth_roles
    }

    /// The declared parameters of the method.
    #[must_use]
    pub fn params(&self) -> &[ParamDescriptor] {
        &self.params
    }

    /// The invocation entry point of the method.
    #[must_use]
    pub fn callable(&self) -> &dyn Callable {
        &*self.callable
    }

    /// Whether a caller with `role` may call the binding.
    #[must_use]
    pub fn is_authorized(&self, role: Option<&str>) -> bool {
        self.auth_roles.is_empty() || role.is_some_and(|role| self.auth_roles.contains(role))
    }
}

/// Bindings are identified by their method name, compared
/// case-insensitively, and their verb.
impl PartialEq for Binding {
    fn eq(&self, other: &Self) -> bool {
        self.verb == other.verb && self.method_name.eq_ignore_ascii_case(&other.method_name)
    }
}

impl Eq for Binding {}

impl Display for Binding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.handler_type, self.method_name)
    }
}

/// A path of the registry with its bindings.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    path: String,
    handler_type: String,
    bindings: Vec<Binding>,
}

impl RouteEntry {
    /// The normalized path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The controller type of the first binding registered for the path.
    #[must_use]
    pub fn handler_type(&self) -> &str {
        &self.handler_type
    }

    /// The bindings of the path, in registration order.
    #[must_use]
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// The binding of the path for `verb`.
    ///
    /// # Errors
    ///
    /// Returns [`MethodNotAllowed`] if the path has no binding for `verb`.
    pub fn binding_for(
        &self,
        verb: RequestVerb,
    ) -> std::result::Result<&Binding, MethodNotAllowed> {
        self.bindings
            .iter()
            .find(|binding| binding.verb == verb)
            .ok_or_else(|| MethodNotAllowed::new(verb, self.path.clone()))
    }

    /// The verbs the path answers to.
    pub fn verbs(&self) -> impl Iterator<Item = RequestVerb> + '_ {
        self.bindings.iter().map(Binding::verb)
    }
}

/// The table of every routed path.
#[derive(Debug, Clone, Default)]
pub struct RouteRegistry {
    entries: HashMap<String, RouteEntry>,
}

impl RouteRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `binding` under `path`, which is normalized first.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateMapping`] if the path already has a binding for
    /// the same verb. The registry keeps the binding registered first.
    pub fn register(&mut self, path: &str, binding: Binding) -> Result<()> {
        let path = normalize_path(path);
        let entry = self
            .entries
            .entry(path.clone())
            .or_insert_with(|| RouteEntry {
                path: path.clone(),
                handler_type: binding.handler_type.clone(),
                bindings: Vec::new(),
            });

        if let Some(existing) = entry.bindings.iter().find(|b| b.verb == binding.verb) {
            return Err(DuplicateMapping::new(
                path,
                binding.verb,
                existing.to_string(),
                binding.to_string(),
            )
            .into());
        }

        debug!(path = %path, verb = %binding.verb, target = %binding, "registered route binding");
        entry.bindings.push(binding);
        Ok(())
    }

    /// Finds the entry of `path`, which is normalized first.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`] if no binding is registered under the path.
    pub fn resolve(&self, path: &str) -> std::result::Result<&RouteEntry, NotFound> {
        let path = normalize_path(path);
        self.entries.get(&path).ok_or_else(|| NotFound::new(path))
    }

    /// The number of routed paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no path is routed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The number of bindings over every path.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.entries.values().map(|entry| entry.bindings.len()).sum()
    }

    /// Every entry, sorted by path.
    #[must_use]
    pub fn entries(&self) -> Vec<&RouteEntry> {
        let mut entries: Vec<_> = self.entries.values().collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        entries
    }
}

/// Normalizes a request or route path.
///
/// The query string and fragment are dropped, repeated slashes are
/// collapsed, the path always starts with `/`, and a trailing `/` is removed
/// except for the root path.
///
/// # Examples
///
/// ```
/// use winter::router::normalize_path;
///
/// assert_eq!(normalize_path("users//list/?page=2"), "/users/list");
/// assert_eq!(normalize_path(""), "/");
/// ```
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let mut normalized = String::with_capacity(path.len() + 1);
    for segment in path.split('/').filter(|segment| !segment.is_empty()) {
        normalized.push('/');
        normalized.push_str(segment);
    }
    if normalized.is_empty() {
        normalized.push('/');
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Controller, ControllerDeclaration, ControllerMetadata};

    #[derive(Default)]
    struct UserController;

    impl Controller for UserController {
        fn declare(controller: &mut ControllerDeclaration<Self>) {
            controller.method("create", |_, _| Ok("created".to_owned())).post();
            controller.method("store", |_, _| Ok("stored".to_owned())).post();
            controller.method("list", |_, _| Ok("list".to_owned()));
            controller.method("CREATE", |_, _| Ok("created".to_owned())).post();
        }
    }

    fn binding(index: usize, roles: &[&str]) -> Binding {
        let metadata = ControllerMetadata::of::<UserController>();
        Binding::new(
            "app.UserController",
            &metadata.methods()[index],
            false,
            roles.iter().map(|&role| role.to_owned()).collect(),
        )
    }

    #[test]
    fn normalize() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("//"), "/");
        assert_eq!(normalize_path("users"), "/users");
        assert_eq!(normalize_path("/users/"), "/users");
        assert_eq!(normalize_path("/a//b#top"), "/a/b");
        assert_eq!(normalize_path("?x=1"), "/");
    }

    #[test]
    fn register_and_resolve() {
        let mut registry = RouteRegistry::new();
        registry.register("/users", binding(0, &[])).unwrap();
        registry.register("/users", binding(2, &[])).unwrap();

        let entry = registry.resolve("/users/").unwrap();

        assert_eq!(entry.path(), "/users");
        assert_eq!(entry.handler_type(), "app.UserController");
        assert_eq!(entry.binding_for(RequestVerb::Post).unwrap().method_name(), "create");
        assert_eq!(entry.binding_for(RequestVerb::Get).unwrap().method_name(), "list");
        assert_eq!(
            entry.verbs().collect::<Vec<_>>(),
            [RequestVerb::Post, RequestVerb::Get]
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.binding_count(), 2);
    }

    #[test]
    fn duplicate_keeps_first_binding() {
        let mut registry = RouteRegistry::new();
        registry.register("/users", binding(0, &[])).unwrap();

        let error = registry.register("/users", binding(1, &[])).unwrap_err();

        let duplicate = error.inner().downcast_ref::<DuplicateMapping>().unwrap();
        assert_eq!(duplicate.path, "/users");
        assert_eq!(duplicate.verb, RequestVerb::Post);
        assert_eq!(duplicate.existing, "app.UserController::create");
        assert_eq!(duplicate.rejected, "app.UserController::store");
        let entry = registry.resolve("/users").unwrap();
        assert_eq!(entry.bindings().len(), 1);
        assert_eq!(entry.binding_for(RequestVerb::Post).unwrap().method_name(), "create");
    }

    #[test]
    fn resolve_missing_path() {
        let registry = RouteRegistry::new();

        let error = registry.resolve("/missing/").unwrap_err();

        assert_eq!(error.path, "/missing");
        assert!(registry.is_empty());
    }

    #[test]
    fn missing_verb() {
        let mut registry = RouteRegistry::new();
        registry.register("/users", binding(0, &[])).unwrap();

        let error = registry
            .resolve("/users")
            .unwrap()
            .binding_for(RequestVerb::Delete)
            .unwrap_err();

        assert_eq!(error.verb, RequestVerb::Delete);
        assert_eq!(error.path, "/users");
    }

    #[test]
    fn binding_equality_ignores_case() {
        assert_eq!(binding(0, &[]), binding(3, &["admin"]));
        assert_ne!(binding(0, &[]), binding(1, &[]));
        assert_ne!(binding(0, &[]), binding(2, &[]));
    }

    #[test]
    fn authorization() {
        let open = binding(2, &[]);
        assert!(open.is_authorized(None));
        assert!(open.is_authorized(Some("user")));

        let restricted = binding(2, &["admin", "manager"]);
        assert!(!restricted.is_authorized(None));
        assert!(!restricted.is_authorized(Some("user")));
        assert!(restricted.is_authorized(Some("manager")));
    }

    #[test]
    fn entries_are_sorted() {
        let mut registry = RouteRegistry::new();
        registry.register("/b", binding(2, &[])).unwrap();
        registry.register("/a", binding(2, &[])).unwrap();

        let paths: Vec<_> = registry.entries().into_iter().map(RouteEntry::path).collect();

        assert_eq!(paths, ["/a", "/b"]);
    }
}
