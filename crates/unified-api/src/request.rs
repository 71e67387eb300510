// Request descriptors and URL rendering.
//
// A descriptor is built by one typed method, rendered once, and dropped.
// Arity mismatches and missing bodies are wiring bugs and panic here rather
// than reaching the network.

use bytes::Bytes;
use serde::Serialize;
use url::Url;

use crate::config::Scheme;
use crate::endpoint::{Endpoint, EndpointSpec, Protocol};
use crate::error::Error;

/// Server-side filter expression, e.g. `name.eq('x')`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter(pub String);

impl Filter {
    pub fn new(expr: impl Into<String>) -> Self {
        Self(expr.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Filter {
    fn from(expr: &str) -> Self {
        Self(expr.to_owned())
    }
}

/// Offset/limit forwarded verbatim; the API paginates server-side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageArguments {
    pub offset: u32,
    pub limit: u32,
}

/// Ordered query multimap. Insertion order is rendering order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query(Vec<(String, String)>);

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    fn distinct_keys(&self) -> usize {
        let mut keys: Vec<&str> = self.0.iter().map(|(k, _)| k.as_str()).collect();
        keys.sort_unstable();
        keys.dedup();
        keys.len()
    }

    /// Percent-encoded `k=v&k=v`, empty when there are no pairs.
    pub fn encode(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter())
            .finish()
    }
}

/// Query for list operations: `filter`, then `offset`, then `limit`, each
/// only when non-empty or non-zero.
pub fn list_query(filter: Option<&Filter>, page: Option<&PageArguments>) -> Query {
    let mut query = Query::new();
    if let Some(filter) = filter.filter(|f| !f.is_empty()) {
        query.push("filter", filter.0.as_str());
    }
    if let Some(page) = page {
        if page.offset != 0 {
            query.push("offset", page.offset.to_string());
        }
        if page.limit != 0 {
            query.push("limit", page.limit.to_string());
        }
    }
    query
}

/// Encoded request body.
#[derive(Debug, Clone)]
pub enum Body {
    Json(Bytes),
    Multipart { boundary: String, bytes: Bytes },
}

impl Body {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, Error> {
        let bytes = serde_json::to_vec(value).map_err(|e| Error::Deserialization {
            message: format!("failed to encode request body: {e}"),
            body: String::new(),
        })?;
        Ok(Self::Json(Bytes::from(bytes)))
    }

    pub fn content_type(&self) -> String {
        match self {
            Self::Json(_) => "application/json".to_owned(),
            Self::Multipart { boundary, .. } => format!("multipart/form-data; boundary={boundary}"),
        }
    }

    pub fn bytes(&self) -> Bytes {
        match self {
            Self::Json(bytes) | Self::Multipart { bytes, .. } => bytes.clone(),
        }
    }
}

/// One call to one endpoint.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub endpoint: Endpoint,
    pub path_args: Vec<String>,
    pub query: Query,
    pub body: Option<Body>,
}

impl RequestDescriptor {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            path_args: Vec::new(),
            query: Query::new(),
            body: None,
        }
    }

    pub fn arg(mut self, arg: impl ToString) -> Self {
        self.path_args.push(arg.to_string());
        self
    }

    pub fn query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    pub fn spec(&self) -> &'static EndpointSpec {
        self.endpoint.spec()
    }

    /// Render the full URL for this request against `host`.
    ///
    /// Panics when the path-argument count differs from the template's
    /// placeholder count, or when more distinct query keys are supplied
    /// than the endpoint accepts.
    pub fn render_url(&self, scheme: Scheme, host: &str) -> Result<Url, Error> {
        let spec = self.spec();
        assert_eq!(
            self.path_args.len(),
            spec.num_path_args,
            "{} expects {} path arguments for '{}'",
            spec.key,
            spec.num_path_args,
            spec.path
        );
        assert!(
            self.query.distinct_keys() <= spec.num_query_args,
            "{} accepts at most {} query keys",
            spec.key,
            spec.num_query_args
        );

        let path = substitute(spec.path, &self.path_args);
        let scheme = match spec.protocol {
            Protocol::Http => scheme.http(),
            Protocol::WebSocket => scheme.websocket(),
        };

        let mut rendered = format!(
            "{scheme}://{host}/proxy/{}/integration/v1/{path}",
            spec.application
        );
        if !self.query.is_empty() {
            rendered.push('?');
            rendered.push_str(&self.query.encode());
        }
        Ok(Url::parse(&rendered)?)
    }
}

/// Replace each `%s` in `template` with the next argument, in order.
fn substitute(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len() + args.iter().map(String::len).sum::<usize>());
    let mut args = args.iter();
    let mut pieces = template.split("%s").peekable();
    while let Some(piece) = pieces.next() {
        out.push_str(piece);
        if pieces.peek().is_some() {
            if let Some(arg) = args.next() {
                out.push_str(arg);
            }
        }
    }
    out
}
