use crate::{Config, Diagnostics, Error, Result, SearchParams, Transport, config::Endpoints};
use geojson::FeatureCollection;
use serde::Serialize;
use serde_json::{Map, Value};
use std::{fmt, sync::Arc};
use url::Url;

/// Searches a geoCore backend and returns GeoJSON.
///
/// The client holds only its configuration, so a single client can be shared
/// between threads as long as its [Transport] can.
///
/// # Examples
///
/// ```no_run
/// use geocore::{Client, Config, SearchParams};
///
/// let client = Client::new(Config::new("https://geocore.example.com")).unwrap();
/// let features = client.search(&SearchParams::new().bbox([-120.0, 45.0, -110.0, 50.0])).unwrap();
/// ```
pub struct Client<T> {
    transport: T,
    endpoints: Endpoints,
    diagnostics: Arc<dyn Diagnostics>,
}

#[cfg(feature = "reqwest")]
impl Client<crate::ReqwestTransport> {
    /// Creates a new client that uses [reqwest] and reports diagnostics to
    /// [tracing].
    ///
    /// Returns [Error::MissingConfig] if the configuration has no base url.
    pub fn new(config: Config) -> Result<Client<crate::ReqwestTransport>> {
        Client::with_transport(
            config,
            crate::ReqwestTransport::new()?,
            Arc::new(crate::TracingDiagnostics),
        )
    }
}

impl<T: Transport> Client<T> {
    /// Creates a new client with the given transport and diagnostics.
    ///
    /// # Examples
    ///
    /// ```
    /// use geocore::{Client, Config, RecordingDiagnostics, ReqwestTransport};
    /// use std::sync::Arc;
    ///
    /// let diagnostics = Arc::new(RecordingDiagnostics::new());
    /// let client = Client::with_transport(
    ///     Config::new("https://geocore.example.com"),
    ///     ReqwestTransport::new().unwrap(),
    ///     diagnostics.clone(),
    /// ).unwrap();
    /// assert_eq!(diagnostics.diagnostics().len(), 1); // no endpoint mapping
    /// ```
    pub fn with_transport(
        config: Config,
        transport: T,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Client<T>> {
        tracing::debug!("map endpoints to client methods");
        let endpoints = config.endpoints(&*diagnostics)?;
        Ok(Client {
            transport,
            endpoints,
            diagnostics,
        })
    }

    /// Returns the search endpoint url.
    pub fn query_url(&self) -> &Url {
        &self.endpoints.query
    }

    /// Returns the single-record endpoint url.
    pub fn get_url(&self) -> &Url {
        &self.endpoints.get
    }

    /// Searches the backend.
    ///
    /// Returns [Error::NoData] if nothing usable came back, which includes a
    /// response body that couldn't be decoded.
    pub fn search(&self, params: &SearchParams) -> Result<FeatureCollection> {
        let query = params.translate(&*self.diagnostics)?;
        let decoded = self.request(&self.endpoints.query, &query)?;
        tracing::debug!("turn geoCore JSON into GeoJSON");
        crate::assemble(decoded, params.skip_geometry, &*self.diagnostics)
    }

    /// Gets a single record by its UUID.
    ///
    /// Returns [Error::InvalidQuery] without touching the network if the
    /// identifier is not a UUID, and [Error::ItemNotFound] if the backend
    /// returned no items.
    pub fn get_by_id(&self, identifier: &str) -> Result<FeatureCollection> {
        tracing::debug!("validating identifier");
        if !crate::is_uuid(identifier) {
            return Err(Error::InvalidQuery(identifier.to_string()));
        }
        let decoded = self.request(&self.endpoints.get, &[("id", identifier)])?;
        let has_items = decoded
            .get("Items")
            .and_then(Value::as_array)
            .is_some_and(|items| !items.is_empty());
        if !has_items {
            return Err(Error::ItemNotFound(identifier.to_string()));
        }
        tracing::debug!("turn geoCore JSON into GeoJSON");
        crate::assemble(decoded, false, &*self.diagnostics)
    }

    fn request(&self, endpoint: &Url, query: &impl Serialize) -> Result<Map<String, Value>> {
        let mut url = endpoint.clone();
        url.set_query(Some(&serde_urlencoded::to_string(query)?));
        tracing::debug!("querying {url}");
        let response = self.transport.get(&url)?;
        if !response.is_success() {
            tracing::error!("{} returned status {}", response.url, response.status);
            return Err(Error::Query {
                url: response.url,
                status: response.status,
            });
        }
        tracing::trace!("{}", response.body);
        Ok(crate::decode(&response.body, &*self.diagnostics))
    }
}

impl<T: fmt::Debug> fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("transport", &self.transport)
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::Client;
    use crate::{
        Config, Diagnostic, Error, RecordingDiagnostics, Response, ResultType, SearchParams,
        Transport,
    };
    use geojson::feature::Id;
    use std::sync::{Arc, Mutex};
    use url::Url;

    const ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    /// Returns the same response to every request and remembers the urls.
    #[derive(Debug)]
    struct Canned {
        status: u16,
        body: String,
        urls: Mutex<Vec<Url>>,
    }

    impl Canned {
        fn new(status: u16, body: &str) -> Canned {
            Canned {
                status,
                body: body.to_string(),
                urls: Mutex::new(Vec::new()),
            }
        }

        fn urls(&self) -> Vec<Url> {
            self.urls.lock().unwrap().clone()
        }
    }

    impl Transport for Canned {
        fn get(&self, url: &Url) -> crate::Result<Response> {
            self.urls.lock().unwrap().push(url.clone());
            Ok(Response {
                url: url.to_string(),
                status: self.status,
                body: self.body.clone(),
            })
        }
    }

    fn client(transport: Arc<Canned>) -> (Client<Arc<Canned>>, Arc<RecordingDiagnostics>) {
        let diagnostics = Arc::new(RecordingDiagnostics::new());
        let config = Config::new("https://geocore.test")
            .query_endpoint("geo")
            .get_endpoint("id");
        let client = Client::with_transport(config, transport, diagnostics.clone()).unwrap();
        (client, diagnostics)
    }

    #[test]
    fn missing_base_url() {
        let err = Client::with_transport(
            Config::default(),
            Canned::new(200, ""),
            Arc::new(RecordingDiagnostics::new()),
        )
        .unwrap_err();
        assert!(matches!(err, Error::MissingConfig("base_url")));
    }

    #[test]
    fn search_url() {
        let transport = Arc::new(Canned::new(200, &format!(r#"{{"Items": [{{"id": "{ID}"}}]}}"#)));
        let (client, _) = client(transport.clone());
        let _ = client
            .search(&SearchParams::new().bbox([-120.0, 45.0, -110.0, 50.0]))
            .unwrap();
        assert_eq!(
            transport.urls()[0].as_str(),
            "https://geocore.test/geo?east=-120.0&west=-110.0&north=50.0&south=45.0&min=1&max=10"
        );
    }

    #[test]
    fn search_repairs_and_assembles() {
        let body = format!(
            r#"{{"Items": [{{"id": "{ID}", "coordinates": """[[[0,0],[1,0],[1,1],[0,0]]]""", "title": "A"}}]}}"#
        );
        let (client, diagnostics) = client(Arc::new(Canned::new(200, &body)));
        let collection = client.search(&SearchParams::new()).unwrap();
        assert_eq!(collection.features.len(), 1);
        assert!(collection.features[0].geometry.is_some());
        assert!(diagnostics.diagnostics().is_empty());
    }

    #[test]
    fn search_unsupported_result_type() {
        let body = format!(r#"{{"Items": [{{"id": "{ID}"}}]}}"#);
        let (client, diagnostics) = client(Arc::new(Canned::new(200, &body)));
        let _ = client
            .search(&SearchParams::new().result_type(ResultType::Hits))
            .unwrap();
        assert!(
            diagnostics
                .diagnostics()
                .contains(&Diagnostic::UnsupportedResultType(ResultType::Hits))
        );
    }

    #[test]
    fn search_undecodable_body_is_no_data() {
        let (client, diagnostics) = client(Arc::new(Canned::new(200, "<html></html>")));
        assert!(matches!(
            client.search(&SearchParams::new()).unwrap_err(),
            Error::NoData
        ));
        assert!(matches!(
            diagnostics.diagnostics()[0],
            Diagnostic::DecodeFailed { .. }
        ));
    }

    #[test]
    fn search_error_status() {
        let (client, _) = client(Arc::new(Canned::new(502, "")));
        let err = client.search(&SearchParams::new()).unwrap_err();
        assert!(matches!(err, Error::Query { status: 502, .. }));
    }

    #[test]
    fn search_invalid_paging() {
        let transport = Arc::new(Canned::new(200, ""));
        let (client, _) = client(transport.clone());
        let err = client
            .search(&SearchParams::new().start_index(u64::MAX))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPaging { .. }));
        let err = client.search(&SearchParams::new().limit(0)).unwrap_err();
        assert!(matches!(err, Error::InvalidPaging { limit: 0, .. }));
        assert!(transport.urls().is_empty());
    }

    #[test]
    fn get_by_id_invalid() {
        let transport = Arc::new(Canned::new(200, ""));
        let (client, _) = client(transport.clone());
        let err = client.get_by_id("not-a-uuid").unwrap_err();
        assert!(matches!(err, Error::InvalidQuery(ref id) if id == "not-a-uuid"));
        assert!(transport.urls().is_empty());
    }

    #[test]
    fn get_by_id_not_found() {
        let transport = Arc::new(Canned::new(200, r#"{"Items": []}"#));
        let (client, _) = client(transport.clone());
        let err = client.get_by_id(ID).unwrap_err();
        assert!(matches!(err, Error::ItemNotFound(ref id) if id == ID));
        assert_eq!(
            transport.urls()[0].as_str(),
            format!("https://geocore.test/id?id={ID}")
        );
    }

    #[test]
    fn get_by_id_empty_body() {
        let (client, _) = client(Arc::new(Canned::new(200, "")));
        assert!(matches!(
            client.get_by_id(ID).unwrap_err(),
            Error::ItemNotFound(_)
        ));
    }

    #[test]
    fn get_by_id() {
        let body = format!(
            r#"{{"Items": [{{"id": "{ID}", "coordinates": [[[0,0],[1,0],[0,0]]], "title": "A"}}]}}"#
        );
        let (client, _) = client(Arc::new(Canned::new(200, &body)));
        let collection = client.get_by_id(ID).unwrap();
        assert_eq!(collection.features.len(), 1);
        assert_eq!(collection.features[0].id, Some(Id::String(ID.to_string())));
        assert!(collection.features[0].geometry.is_some());
    }

    #[test]
    fn get_by_id_with_only_invalid_records() {
        let (client, _) = client(Arc::new(Canned::new(200, r#"{"Items": [{"id": "nope"}]}"#)));
        assert!(matches!(client.get_by_id(ID).unwrap_err(), Error::NoData));
    }

    #[cfg(feature = "reqwest")]
    mod http {
        use crate::{Client, Config, Error, SearchParams};
        use mockito::Matcher;

        const ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

        #[test]
        fn search() {
            let mut server = mockito::Server::new();
            let mock = server
                .mock("GET", "/geo")
                .match_query(Matcher::AllOf(vec![
                    Matcher::UrlEncoded("keyword_only".into(), "true".into()),
                    Matcher::UrlEncoded("min".into(), "21".into()),
                    Matcher::UrlEncoded("max".into(), "25".into()),
                ]))
                .with_body(format!(r#"{{"Items": [{{"id": "{ID}", "title": "A"}}]}}"#))
                .create();
            let client = Client::new(Config::new(server.url())).unwrap();
            let collection = client
                .search(&SearchParams::new().start_index(20).limit(5))
                .unwrap();
            mock.assert();
            assert_eq!(collection.features.len(), 1);
        }

        #[test]
        fn get_by_id_custom_endpoint() {
            let mut server = mockito::Server::new();
            let mock = server
                .mock("GET", "/record")
                .match_query(Matcher::UrlEncoded("id".into(), ID.into()))
                .with_body(r#"{"Items": []}"#)
                .create();
            let client =
                Client::new(Config::new(format!("{}/", server.url())).get_endpoint("record"))
                    .unwrap();
            assert!(matches!(
                client.get_by_id(ID).unwrap_err(),
                Error::ItemNotFound(_)
            ));
            mock.assert();
        }

        #[test]
        fn not_found_status() {
            let mut server = mockito::Server::new();
            let _mock = server
                .mock("GET", "/geo")
                .match_query(Matcher::Any)
                .with_status(404)
                .create();
            let client = Client::new(Config::new(server.url())).unwrap();
            assert!(matches!(
                client.search(&SearchParams::new()).unwrap_err(),
                Error::Query { status: 404, .. }
            ));
        }

        #[test]
        fn connection_refused() {
            let client = Client::new(Config::new("http://127.0.0.1:1")).unwrap();
            assert!(matches!(
                client.search(&SearchParams::new()).unwrap_err(),
                Error::Connection { .. }
            ));
        }
    }
}
