use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The HTTP verbs a controller method can be bound to.
///
/// # Examples
///
/// ```
/// use winter::RequestVerb;
///
/// assert_eq!(RequestVerb::default(), RequestVerb::Get);
/// assert_eq!("post".parse::<RequestVerb>(), Ok(RequestVerb::Post));
/// assert_eq!(RequestVerb::try_from(&http::Method::DELETE), Ok(RequestVerb::Delete));
/// ```
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestVerb {
    /// `GET`, the verb used when a method declares none.
    #[default]
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl RequestVerb {
    /// All the supported verbs.
    pub const ALL: [Self; 4] = [Self::Get, Self::Post, Self::Put, Self::Delete];

    /// Returns the canonical upper-case name of the verb.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl Display for RequestVerb {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The verb is not one of the supported [`RequestVerb`]s.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported request verb `{0}`")]
pub struct UnsupportedVerb(pub String);

impl FromStr for RequestVerb {
    type Err = UnsupportedVerb;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|verb| verb.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnsupportedVerb(s.to_owned()))
    }
}

impl TryFrom<&http::Method> for RequestVerb {
    type Error = UnsupportedVerb;

    fn try_from(method: &http::Method) -> Result<Self, Self::Error> {
        match *method {
            http::Method::GET => Ok(Self::Get),
            http::Method::POST => Ok(Self::Post),
            http::Method::PUT => Ok(Self::Put),
            http::Method::DELETE => Ok(Self::Delete),
            _ => Err(UnsupportedVerb(method.as_str().to_owned())),
        }
    }
}

impl From<RequestVerb> for http::Method {
    fn from(verb: RequestVerb) -> Self {
        match verb {
            RequestVerb::Get => Self::GET,
            RequestVerb::Post => Self::POST,
            RequestVerb::Put => Self::PUT,
            RequestVerb::Delete => Self::DELETE,
        }
    }
}
