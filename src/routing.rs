//! Named routes and URL generation.

use std::collections::{BTreeMap, HashMap};

/// Route parameters, e.g. `{"id": "42"}`.
pub type RouteParams = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoutingError {
    #[error("Unable to generate a URL for the named route '{0}' as such route does not exist")]
    UnknownRoute(String),

    #[error("Some mandatory parameters are missing (\"{parameter}\") to generate a URL for route \"{route}\"")]
    MissingParameter { route: String, parameter: String },

    #[error("Route '{route}' has an unterminated placeholder")]
    MalformedPattern { route: String },
}

/// Generates URLs for named routes.
pub trait UrlGenerator: Send + Sync {
    fn generate(&self, route: &str, params: &RouteParams) -> Result<String, RoutingError>;
}

/// Route table with `{name}` placeholders in path patterns.
///
/// Parameters not named by the pattern are ignored.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, String>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(mut self, name: &str, pattern: &str) -> Self {
        self.routes.insert(name.to_string(), pattern.to_string());
        self
    }

    pub fn pattern(&self, name: &str) -> Option<&str> {
        self.routes.get(name).map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for RouteTable
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            routes: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl UrlGenerator for RouteTable {
    fn generate(&self, route: &str, params: &RouteParams) -> Result<String, RoutingError> {
        let pattern = self
            .pattern(route)
            .ok_or_else(|| RoutingError::UnknownRoute(route.to_string()))?;

        let mut url = String::with_capacity(pattern.len());
        let mut rest = pattern;
        while let Some(open) = rest.find('{') {
            url.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(|| RoutingError::MalformedPattern {
                route: route.to_string(),
            })?;
            let name = &after[..close];
            let value = params
                .get(name)
                .ok_or_else(|| RoutingError::MissingParameter {
                    route: route.to_string(),
                    parameter: name.to_string(),
                })?;
            url.push_str(value);
            rest = &after[close + 1..];
        }
        url.push_str(rest);
        Ok(url)
    }
}
