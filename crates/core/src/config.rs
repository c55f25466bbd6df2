use crate::{Diagnostic, Diagnostics, Error, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// The endpoint used for searches when none is configured.
pub const DEFAULT_QUERY_ENDPOINT: &str = "geo";

/// The endpoint used for single-record lookups when none is configured.
pub const DEFAULT_GET_ENDPOINT: &str = "id";

/// Backend configuration, usually the `data` of a provider definition.
///
/// # Examples
///
/// ```
/// use geocore::Config;
///
/// let config: Config = serde_json::from_str(r#"{
///     "base_url": "https://geocore.example.com/",
///     "mapping": {"query": "search"}
/// }"#).unwrap();
/// assert_eq!(config.base_url.as_deref(), Some("https://geocore.example.com/"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// The backend's base url. Required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Endpoint names, relative to the base url.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<Mapping>,
}

/// Maps client operations to backend endpoint names.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mapping {
    /// The search endpoint, `geo` by default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// The single-record endpoint, `id` by default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<String>,
}

/// Resolved endpoint urls.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Endpoints {
    pub(crate) query: Url,
    pub(crate) get: Url,
}

impl Config {
    /// Creates a configuration with a base url and the default endpoints.
    ///
    /// # Examples
    ///
    /// ```
    /// use geocore::Config;
    ///
    /// let config = Config::new("https://geocore.example.com");
    /// assert!(config.mapping.is_none());
    /// ```
    pub fn new(base_url: impl ToString) -> Config {
        Config {
            base_url: Some(base_url.to_string()),
            mapping: None,
        }
    }

    /// Sets the search endpoint.
    pub fn query_endpoint(mut self, endpoint: impl ToString) -> Config {
        self.mapping.get_or_insert_with(Mapping::default).query = Some(endpoint.to_string());
        self
    }

    /// Sets the single-record endpoint.
    pub fn get_endpoint(mut self, endpoint: impl ToString) -> Config {
        self.mapping.get_or_insert_with(Mapping::default).get = Some(endpoint.to_string());
        self
    }

    pub(crate) fn endpoints(&self, diagnostics: &dyn Diagnostics) -> Result<Endpoints> {
        let base_url = self
            .base_url
            .as_deref()
            .ok_or(Error::MissingConfig("base_url"))?
            .trim_end_matches('/');
        let mapping = self.mapping.clone().unwrap_or_default();
        if mapping == Mapping::default() {
            diagnostics.emit(Diagnostic::DefaultEndpoints);
        }
        let query = mapping.query.as_deref().unwrap_or(DEFAULT_QUERY_ENDPOINT);
        let get = mapping.get.as_deref().unwrap_or(DEFAULT_GET_ENDPOINT);
        Ok(Endpoints {
            query: Url::parse(&format!("{base_url}/{query}"))?,
            get: Url::parse(&format!("{base_url}/{get}"))?,
        })
    }
}
