//! Configuration of the front controller.
//!
//! The only setting an application has to provide is the package its
//! controllers live in. [`WinterConfig`] is deserialized from TOML with
//! [`WinterConfig::from_toml`] or built in code with
//! [`WinterConfigBuilder`].

// config structures might be extended with non-Copy types in the future
#![allow(missing_copy_implementations)]

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::impl_into_winter_error;
use crate::response::ERROR_VIEW_ATTRIBUTE;

/// The session attribute holding the role of the caller, by default.
pub const DEFAULT_AUTH_SESSION_KEY: &str = "auth";

/// The configuration of a [`FrontController`](crate::FrontController).
///
/// # Examples
///
/// ```
/// use winter::config::WinterConfig;
///
/// let config = WinterConfig::from_toml(
///     r#"
/// controllers_package = "app.controllers"
/// debug = true
/// "#,
/// )?;
///
/// assert_eq!(config.controllers_package.as_deref(), Some("app.controllers"));
/// assert!(config.debug);
/// assert_eq!(config.auth_session_key, "auth");
/// # Ok::<(), winter::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(build_fn(skip, error = std::convert::Infallible))]
#[serde(default)]
pub struct WinterConfig {
    /// The dotted package scanned for controllers, such as
    /// `app.controllers`.
    ///
    /// Initialization fails when it is missing.
    #[builder(setter(into, strip_option), default)]
    pub controllers_package: Option<String>,
    /// Debug mode flag.
    ///
    /// When set, the message of an internal error sent to the caller holds
    /// the whole chain of causes instead of a generic message.
    pub debug: bool,
    /// The session attribute holding the role of the caller, compared with
    /// the roles a binding allows. The default is `"auth"`.
    #[builder(setter(into))]
    pub auth_session_key: String,
    /// The attribute naming the view rendered instead of the target view
    /// when binding failed. The default is `"errorUrl"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use winter::config::WinterConfig;
    ///
    /// let config = WinterConfig::builder().error_view_attribute("onError").build();
    /// assert_eq!(config.error_view_attribute, "onError");
    /// ```
    #[builder(setter(into))]
    pub error_view_attribute: String,
}

impl WinterConfig {
    /// Create a new [`WinterConfigBuilder`] to build a [`WinterConfig`].
    ///
    /// # Examples
    ///
    /// ```
    /// use winter::config::WinterConfig;
    ///
    /// let config = WinterConfig::builder().controllers_package("app").build();
    /// assert_eq!(config.controllers_package.as_deref(), Some("app"));
    /// ```
    #[must_use]
    pub fn builder() -> WinterConfigBuilder {
        WinterConfigBuilder::default()
    }

    /// Create a new [`WinterConfig`] from a TOML string.
    ///
    /// # Errors
    ///
    /// This function will return an error if the TOML fails to parse as a
    /// [`WinterConfig`].
    pub fn from_toml(toml_content: &str) -> crate::Result<WinterConfig> {
        let config: WinterConfig = toml::from_str(toml_content).map_err(ParseConfig)?;
        Ok(config)
    }
}

impl Default for WinterConfig {
    fn default() -> Self {
        WinterConfig::builder().build()
    }
}

impl WinterConfigBuilder {
    /// Builds the configuration.
    #[must_use]
    pub fn build(&self) -> WinterConfig {
        WinterConfig {
            controllers_package: self.controllers_package.clone().unwrap_or_default(),
            debug: self.debug.unwrap_or_default(),
            auth_session_key: self
                .auth_session_key
                .clone()
                .unwrap_or_else(|| DEFAULT_AUTH_SESSION_KEY.to_owned()),
            error_view_attribute: self
                .error_view_attribute
                .clone()
                .unwrap_or_else(|| ERROR_VIEW_ATTRIBUTE.to_owned()),
        }
    }
}

#[derive(Debug, Error)]
#[error("could not parse the configuration: {0}")]
struct ParseConfig(#[source] toml::de::Error);
impl_into_winter_error!(ParseConfig);
