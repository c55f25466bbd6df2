use crate::Result;
use std::sync::Arc;
use url::Url;

/// Performs GET requests against the backend.
///
/// Implementations report an unreachable backend as
/// [Error::Connection](crate::Error::Connection). Any status code, successful
/// or not, is returned as a [Response].
pub trait Transport: Send + Sync {
    /// Gets a url, query string included.
    fn get(&self, url: &Url) -> Result<Response>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn get(&self, url: &Url) -> Result<Response> {
        (**self).get(url)
    }
}

/// A backend response.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    /// The final url, after any redirects.
    pub url: String,

    /// The http status code.
    pub status: u16,

    /// The response body.
    pub body: String,
}

impl Response {
    /// Returns true if the status is 2xx.
    ///
    /// # Examples
    ///
    /// ```
    /// use geocore::Response;
    ///
    /// let response = Response { url: "http://geocore.test".to_string(), status: 404, body: String::new() };
    /// assert!(!response.is_success());
    /// ```
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(feature = "reqwest")]
pub use blocking::ReqwestTransport;

#[cfg(feature = "reqwest")]
mod blocking {
    use super::{Response, Transport};
    use crate::{Error, Result};
    use reqwest::blocking::Client;
    use url::Url;

    /// A blocking [reqwest] transport.
    #[derive(Clone, Debug)]
    pub struct ReqwestTransport(Client);

    impl ReqwestTransport {
        /// Creates a new transport that sends this crate's user agent.
        ///
        /// # Examples
        ///
        /// ```
        /// use geocore::ReqwestTransport;
        ///
        /// let transport = ReqwestTransport::new().unwrap();
        /// ```
        pub fn new() -> Result<ReqwestTransport> {
            let client = Client::builder().user_agent(crate::user_agent()).build()?;
            Ok(ReqwestTransport(client))
        }

        /// Wraps an existing client, e.g. one with a timeout.
        pub fn from_client(client: Client) -> ReqwestTransport {
            ReqwestTransport(client)
        }
    }

    impl Transport for ReqwestTransport {
        fn get(&self, url: &Url) -> Result<Response> {
            let connection_error = |err: reqwest::Error| Error::Connection {
                url: url.to_string(),
                message: err.to_string(),
            };
            let response = self.0.get(url.clone()).send().map_err(connection_error)?;
            let status = response.status().as_u16();
            let final_url = response.url().to_string();
            let body = response.text().map_err(connection_error)?;
            Ok(Response {
                url: final_url,
                status,
                body,
            })
        }
    }

}
