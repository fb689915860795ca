use std::{collections::HashMap, path::PathBuf, sync::Arc};

use axum::{
    body::{to_bytes, Body},
    extract::{Query, Request, State},
    http::{header, request::Parts, Method, StatusCode, Uri},
    middleware::{from_fn_with_state, Next},
    response::{IntoResponse, Redirect, Response},
    Json, Router,
};
use coverage_middleware::{CoverageError, CoverageMiddleware, CoverageRequest, Dispatch, REPORT_PATH};
use serde_json::{Map, Value};
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tracing::{debug, error};

mod logging;
pub use logging::{init_logging, InitError, LogOptions};

/// Upper bound for posted coverage payloads.
pub const MAX_REPORT_BODY_SIZE: usize = 50 * 1024 * 1024;

/// Puts the coverage endpoints and instrumentation in front of every route
/// (and the fallback) registered on `router` so far.
pub fn with_coverage<S>(router: Router<S>, middleware: Arc<CoverageMiddleware>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(from_fn_with_state(middleware, coverage_middleware))
}

/// `axum::middleware::from_fn_with_state` handler driving a [`CoverageMiddleware`].
pub async fn coverage_middleware(
    State(middleware): State<Arc<CoverageMiddleware>>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();

    let mut coverage_request = CoverageRequest::new(parts.method.clone(), parts.uri.path());
    coverage_request.query = query_parameters(&parts.uri);

    let body = if parts.method == Method::POST && parts.uri.path() == REPORT_PATH {
        match read_json_body(body).await {
            Ok(payload) => coverage_request.body = payload,
            Err(response) => return response,
        }
        Body::empty()
    } else {
        body
    };

    match middleware.handle(&coverage_request).await {
        Ok(Dispatch::Next) => next.run(Request::from_parts(parts, body)).await,
        Ok(Dispatch::Ping(ping)) => Json(ping).into_response(),
        Ok(Dispatch::Report(report)) => Json(report).into_response(),
        Ok(Dispatch::Instrumented(transformed)) => (
            [(header::CONTENT_TYPE, transformed.content_type.mime_type())],
            transformed.text,
        )
            .into_response(),
        Ok(Dispatch::ReportViewer { root, path }) => serve_report(root, path, parts).await,
        Err(err) => error_response(&coverage_request, err),
    }
}

fn query_parameters(uri: &Uri) -> Map<String, Value> {
    match Query::<HashMap<String, String>>::try_from_uri(uri) {
        Ok(Query(params)) => params
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect(),
        Err(err) => {
            debug!("Ignoring malformed query of {}: {}", uri, err);
            Default::default()
        }
    }
}

async fn read_json_body(body: Body) -> Result<Option<Value>, Response> {
    let bytes = to_bytes(body, MAX_REPORT_BODY_SIZE).await.map_err(|err| {
        (StatusCode::PAYLOAD_TOO_LARGE, format!("Could not read report data: {}", err)).into_response()
    })?;

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    serde_json::from_slice(&bytes).map(Some).map_err(|err| {
        (StatusCode::BAD_REQUEST, format!("Invalid report data: {}", err)).into_response()
    })
}

/// Serves `path` from the report directory. Directories are redirected to
/// their trailing-slash form so relative links of the report pages resolve.
async fn serve_report(root: PathBuf, path: String, mut parts: Parts) -> Response {
    let relative = path.trim_start_matches('/');
    if !path.ends_with('/') && root.join(relative).is_dir() {
        return Redirect::temporary(&format!("{}/", parts.uri.path())).into_response();
    }

    parts.uri = match path.parse::<Uri>() {
        Ok(uri) => uri,
        Err(err) => return (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
    };

    match ServeDir::new(root)
        .oneshot(Request::from_parts(parts, Body::empty()))
        .await
    {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

fn error_response(request: &CoverageRequest, err: CoverageError) -> Response {
    match err {
        CoverageError::NoReportData => (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
        err => {
            error!("{} {} failed: {}", request.method, request.path, err);
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}
