use crate::{Diagnostic, Diagnostics, Error, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The default number of records returned by a search.
pub const DEFAULT_LIMIT: u64 = 10;

/// An abstract search request.
///
/// Paging is zero-based: `start_index = 0` is the first record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// The first record to return, zero-based.
    #[serde(default)]
    pub start_index: u64,

    /// The number of records to return.
    #[serde(default = "default_limit")]
    pub limit: u64,

    /// Return results or only the hit count.
    ///
    /// Only [ResultType::Results] is supported by the backend.
    #[serde(default, rename = "resulttype")]
    pub result_type: ResultType,

    /// `[minx, miny, maxx, maxy]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f64; 4]>,

    /// Whether to leave the geometry out of the returned features.
    #[serde(default)]
    pub skip_geometry: bool,

    /// Full-text search term(s).
    ///
    /// Not mapped to the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_text: Option<String>,

    /// Temporal filter, a datestamp or an extent.
    ///
    /// Not mapped to the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,

    /// Property filters as `(name, value)` pairs.
    ///
    /// Not mapped to the backend.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<(String, String)>,

    /// Sort fields.
    ///
    /// Not mapped to the backend.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sortby: Vec<String>,

    /// Property names to return.
    ///
    /// Not mapped to the backend.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub select_properties: Vec<String>,
}

/// What a search should return.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    /// The matching records.
    #[default]
    Results,

    /// Only the number of matching records.
    Hits,
}

/// The backend's query parameters.
///
/// Record indices are one-based and inclusive.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BackendQuery {
    /// The backend calls the minimum x `east`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub east: Option<f64>,

    /// The backend calls the maximum x `west`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub west: Option<f64>,

    /// Maximum y.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub north: Option<f64>,

    /// Minimum y.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub south: Option<f64>,

    /// Set when there is no bbox, to ask for a non-spatial search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword_only: Option<bool>,

    /// The first record to return, one-based.
    pub min: u64,

    /// The last record to return, one-based and inclusive.
    pub max: u64,
}

impl SearchParams {
    /// Creates new search parameters with default paging.
    ///
    /// # Examples
    ///
    /// ```
    /// use geocore::SearchParams;
    ///
    /// let params = SearchParams::new();
    /// assert_eq!(params.start_index, 0);
    /// assert_eq!(params.limit, 10);
    /// ```
    pub fn new() -> SearchParams {
        SearchParams::default()
    }

    /// Sets the bbox of these parameters.
    pub fn bbox(mut self, bbox: [f64; 4]) -> SearchParams {
        self.bbox = Some(bbox);
        self
    }

    /// Sets the start index of these parameters.
    pub fn start_index(mut self, start_index: u64) -> SearchParams {
        self.start_index = start_index;
        self
    }

    /// Sets the limit of these parameters.
    pub fn limit(mut self, limit: u64) -> SearchParams {
        self.limit = limit;
        self
    }

    /// Sets the result type of these parameters.
    pub fn result_type(mut self, result_type: ResultType) -> SearchParams {
        self.result_type = result_type;
        self
    }

    /// Sets whether geometries should be skipped.
    pub fn skip_geometry(mut self, skip_geometry: bool) -> SearchParams {
        self.skip_geometry = skip_geometry;
        self
    }

    /// Sets the free text of these parameters.
    pub fn free_text(mut self, free_text: impl ToString) -> SearchParams {
        self.free_text = Some(free_text.to_string());
        self
    }

    /// Translates these parameters into the backend's vocabulary.
    ///
    /// An unsupported [ResultType] is reported to `diagnostics` and the
    /// translation carries on as if [ResultType::Results] was requested. Free
    /// text, datetime, properties, sortby, and select properties have no
    /// backend counterpart and are ignored.
    ///
    /// Returns [Error::InvalidPaging] if the limit is zero or the record range
    /// doesn't fit in a `u64`.
    ///
    /// # Examples
    ///
    /// ```
    /// use geocore::{SearchParams, TracingDiagnostics};
    ///
    /// let query = SearchParams::new()
    ///     .start_index(20)
    ///     .limit(5)
    ///     .translate(&TracingDiagnostics)
    ///     .unwrap();
    /// assert_eq!(query.min, 21);
    /// assert_eq!(query.max, 25);
    /// assert_eq!(query.keyword_only, Some(true));
    /// ```
    pub fn translate(&self, diagnostics: &dyn Diagnostics) -> Result<BackendQuery> {
        let invalid_paging = || Error::InvalidPaging {
            start_index: self.start_index,
            limit: self.limit,
        };
        if self.limit == 0 {
            return Err(invalid_paging());
        }
        if self.result_type != ResultType::Results {
            diagnostics.emit(Diagnostic::UnsupportedResultType(self.result_type));
        }
        let mut query = BackendQuery::default();
        if let Some([minx, miny, maxx, maxy]) = self.bbox {
            tracing::debug!("processing bbox parameter");
            query.east = Some(minx);
            query.west = Some(maxx);
            query.north = Some(maxy);
            query.south = Some(miny);
        } else {
            tracing::debug!("set keyword_only search");
            query.keyword_only = Some(true);
        }
        query.min = self.start_index.checked_add(1).ok_or_else(invalid_paging)?;
        query.max = self
            .start_index
            .checked_add(self.limit)
            .ok_or_else(invalid_paging)?;
        Ok(query)
    }
}

impl Default for SearchParams {
    fn default() -> SearchParams {
        SearchParams {
            start_index: 0,
            limit: DEFAULT_LIMIT,
            result_type: ResultType::Results,
            bbox: None,
            skip_geometry: false,
            free_text: None,
            datetime: None,
            properties: Vec::new(),
            sortby: Vec::new(),
            select_properties: Vec::new(),
        }
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultType::Results => f.write_str("results"),
            ResultType::Hits => f.write_str("hits"),
        }
    }
}

impl FromStr for ResultType {
    type Err = Error;

    fn from_str(s: &str) -> Result<ResultType> {
        match s {
            "results" => Ok(ResultType::Results),
            "hits" => Ok(ResultType::Hits),
            _ => Err(Error::UnknownResultType(s.to_string())),
        }
    }
}

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}
