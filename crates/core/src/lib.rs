//! Search a geoCore metadata backend and get
//! [GeoJSON](https://geojson.org) back.
//!
//! geoCore speaks its own query vocabulary and returns JSON that isn't quite
//! JSON: some array values come back as quote-doubled strings. This crate
//! translates searches into geoCore parameters, repairs and decodes the
//! responses, and reshapes the records into GeoJSON features.
//!
//! ```no_run
//! use geocore::{Client, Config, SearchParams};
//!
//! let client = Client::new(Config::new("https://geocore.example.com")).unwrap();
//! let search = SearchParams::new().bbox([-120.0, 45.0, -110.0, 50.0]).limit(5);
//! let feature_collection = client.search(&search).unwrap();
//! for feature in feature_collection.features {
//!     println!("{:?}", feature.id);
//! }
//! ```
//!
//! The pieces can also be used on their own:
//!
//! ```
//! use geocore::{TracingDiagnostics, assemble, decode};
//!
//! let body = r#"{"Items": [{
//!     "id": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
//!     "coordinates": """[[[0,0],[1,0],[1,1],[0,0]]]""",
//!     "title": "A"
//! }]}"#;
//! let decoded = decode(body, &TracingDiagnostics);
//! let feature_collection = assemble(decoded, false, &TracingDiagnostics).unwrap();
//! assert!(feature_collection.features[0].geometry.is_some());
//! ```
//!
//! # Features
//!
//! - `reqwest` (default): a blocking [reqwest] transport and [Client::new]

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![warn(missing_docs, unused_qualifications)]

mod assemble;
mod client;
mod config;
mod decode;
mod diagnostics;
mod error;
mod query;
mod transport;

#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
pub use {
    assemble::assemble,
    client::Client,
    config::{Config, DEFAULT_GET_ENDPOINT, DEFAULT_QUERY_ENDPOINT, Mapping},
    decode::{decode, repair},
    diagnostics::{Diagnostic, Diagnostics, RecordingDiagnostics, TracingDiagnostics},
    error::Error,
    query::{BackendQuery, DEFAULT_LIMIT, ResultType, SearchParams},
    transport::{Response, Transport},
};

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns true if this identifier is a hyphenated UUID.
///
/// Only the canonical 8-4-4-4-12 form is accepted, in either case.
///
/// # Examples
///
/// ```
/// assert!(geocore::is_uuid("3fa85f64-5717-4562-b3fc-2c963f66afa6"));
/// assert!(geocore::is_uuid("3FA85F64-5717-4562-B3FC-2C963F66AFA6"));
/// assert!(!geocore::is_uuid("3fa85f6457174562b3fc2c963f66afa6"));
/// assert!(!geocore::is_uuid("not-a-uuid"));
/// ```
pub fn is_uuid(identifier: &str) -> bool {
    identifier.len() == 36 && uuid::Uuid::try_parse(identifier).is_ok()
}

/// Returns a string suitable for use as a HTTP user agent.
pub fn user_agent() -> &'static str {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"))
}

/// Return this crate's version.
///
/// # Examples
///
/// ```
/// println!("{}", geocore::version());
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
