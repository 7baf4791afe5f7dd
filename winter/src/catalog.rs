//! The source of types the scanner walks.
//!
//! Types live in dotted namespaces (`app.controllers.admin`). A
//! [`TypeSource`] lists the types and child namespaces of a namespace, and
//! gives access to the [`ControllerMetadata`] of the types that are
//! controllers.
//!
//! [`TypeCatalog`] is the in-memory [`TypeSource`]. Controllers are added to
//! it explicitly with [`TypeCatalog::register`], or at load time with the
//! [`register_controller!`](crate::register_controller) macro and collected
//! with [`TypeCatalog::from_inventory`].
//!
//! # Examples
//!
//! ```
//! use winter::catalog::{TypeCatalog, TypeSource};
//! # use winter::controller::{Controller, ControllerDeclaration};
//! # #[derive(Default)]
//! # struct UserController;
//! # impl Controller for UserController {
//! #     fn declare(_controller: &mut ControllerDeclaration<Self>) {}
//! # }
//!
//! let mut catalog = TypeCatalog::new();
//! catalog
//!     .register::<UserController>("app.controllers")
//!     .register_plain("app.controllers.util", "Helpers");
//!
//! let listing = catalog.enumerate_types("app.controllers").unwrap();
//! assert_eq!(listing.types, ["UserController"]);
//! assert_eq!(listing.namespaces, ["util"]);
//! assert!(catalog.controller_metadata("app.controllers.UserController").is_some());
//! assert!(catalog.controller_metadata("app.controllers.util.Helpers").is_none());
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::controller::{Controller, ControllerMetadata};

/// The content of one namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    /// The simple names of the types of the namespace, sorted.
    pub types: Vec<String>,
    /// The simple names of the child namespaces, sorted.
    pub namespaces: Vec<String>,
}

/// A source of types, organized in dotted namespaces.
pub trait TypeSource {
    /// Lists the content of `namespace`, or returns `None` if it does not
    /// exist.
    fn enumerate_types(&self, namespace: &str) -> Option<Listing>;

    /// The metadata of the type qualified as `type_id`
    /// (`namespace.TypeName`), or `None` if it is not a controller.
    fn controller_metadata(&self, type_id: &str) -> Option<&ControllerMetadata>;
}

#[derive(Debug, Clone, Default)]
struct Namespace {
    types: BTreeSet<String>,
    children: BTreeMap<String, Namespace>,
}

/// An in-memory [`TypeSource`].
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    root: Namespace,
    controllers: HashMap<String, ControllerMetadata>,
}

impl TypeCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog holding every controller submitted with
    /// [`register_controller!`](crate::register_controller).
    #[must_use]
    pub fn from_inventory() -> Self {
        let mut catalog = Self::new();
        for registration in inventory::iter::<ControllerRegistration> {
            (registration.register)(&mut catalog, registration.namespace);
        }
        catalog
    }

    /// Adds the controller `C` to `namespace`, under its
    /// [`Controller::name`].
    pub fn register<C: Controller>(&mut self, namespace: &str) -> &mut Self {
        let metadata = ControllerMetadata::of::<C>();
        let name = metadata.name();
        self.namespace_mut(namespace).types.insert(name.to_owned());
        self.controllers
            .insert(qualify(namespace, name), metadata);
        self
    }

    /// Adds a type that is not a controller to `namespace`.
    pub fn register_plain(&mut self, namespace: &str, name: &str) -> &mut Self {
        self.namespace_mut(namespace).types.insert(name.to_owned());
        self
    }

    /// The number of controllers in the catalog.
    #[must_use]
    pub fn controller_count(&self) -> usize {
        self.controllers.len()
    }

    fn namespace(&self, path: &str) -> Option<&Namespace> {
        segments(path).try_fold(&self.root, |namespace, segment| {
            namespace.children.get(segment)
        })
    }

    fn namespace_mut(&mut self, path: &str) -> &mut Namespace {
        segments(path).fold(&mut self.root, |namespace, segment| {
            namespace.children.entry(segment.to_owned()).or_default()
        })
    }
}

impl TypeSource for TypeCatalog {
    fn enumerate_types(&self, namespace: &str) -> Option<Listing> {
        self.namespace(namespace).map(|namespace| Listing {
            types: namespace.types.iter().cloned().collect(),
            namespaces: namespace.children.keys().cloned().collect(),
        })
    }

    fn controller_metadata(&self, type_id: &str) -> Option<&ControllerMetadata> {
        self.controllers.get(type_id)
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('.').filter(|segment| !segment.is_empty())
}

fn qualify(namespace: &str, name: &str) -> String {
    segments(namespace).chain([name]).collect::<Vec<_>>().join(".")
}

/// A controller submitted at load time. Created by
/// [`register_controller!`](crate::register_controller).
#[derive(Debug)]
pub struct ControllerRegistration {
    namespace: &'static str,
    register: fn(&mut TypeCatalog, &str),
}

impl ControllerRegistration {
    /// A registration of the controller `C` in `namespace`.
    #[must_use]
    pub const fn new<C: Controller>(namespace: &'static str) -> Self {
        Self {
            namespace,
            register: register_into::<C>,
        }
    }

    /// The namespace the controller is registered in.
    #[must_use]
    pub const fn namespace(&self) -> &'static str {
        self.namespace
    }
}

fn register_into<C: Controller>(catalog: &mut TypeCatalog, namespace: &str) {
    catalog.register::<C>(namespace);
}

inventory::collect!(ControllerRegistration);

/// Registers a controller in a namespace at load time.
///
/// The controller becomes part of every catalog created with
/// [`TypeCatalog::from_inventory`].
///
/// # Examples
///
/// ```
/// use winter::catalog::{TypeCatalog, TypeSource};
/// use winter::controller::{Controller, ControllerDeclaration};
///
/// #[derive(Default)]
/// struct HomeController;
///
/// impl Controller for HomeController {
///     fn declare(controller: &mut ControllerDeclaration<Self>) {
///         controller.method("index", |_, _| Ok("home".to_owned())).url("/");
///     }
/// }
///
/// winter::register_controller!(HomeController, "site.controllers");
///
/// let catalog = TypeCatalog::from_inventory();
/// assert!(catalog.controller_metadata("site.controllers.HomeController").is_some());
/// ```
#[macro_export]
macro_rules! register_controller {
    ($controller:ty, $namespace:expr) => {
        $crate::__private::inventory::submit! {
            $crate::catalog::ControllerRegistration::new::<$controller>($namespace)
        }
    };
}
