use http::Method;
use serde_json::{Map, Value};

/// Transport-neutral view of an incoming request.
#[derive(Clone, Debug, PartialEq)]
pub struct CoverageRequest {
    pub method: Method,
    /// Pathname without query string.
    pub path: String,
    pub query: Map<String, Value>,
    pub body: Option<Value>,
}

impl CoverageRequest {
    pub fn new(method: Method, path: impl Into<String>) -> CoverageRequest {
        CoverageRequest {
            method,
            path: path.into(),
            query: Default::default(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> CoverageRequest {
        CoverageRequest::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> CoverageRequest {
        CoverageRequest::new(Method::POST, path)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<Value>) -> CoverageRequest {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> CoverageRequest {
        self.body = Some(body);
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&Value> {
        self.query.get(key)
    }
}
