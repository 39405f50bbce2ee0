//! Origin allow-listing.
//!
//! Two pieces work together: [`origin_gate_middleware`] refuses requests whose
//! `Origin` is not on the list before any routing or body parsing happens, and
//! [`cors_layer`] emits the CORS response headers (and answers preflights) for
//! the origins that got through.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode, header::ORIGIN},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashSet;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tracing::warn;

/// Immutable set of browser origins allowed to call the service.
#[derive(Debug, Clone, Default)]
pub struct OriginAllowList {
    origins: Arc<HashSet<String>>,
}

impl OriginAllowList {
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            origins: Arc::new(origins.into_iter().map(Into::into).collect()),
        }
    }

    /// Requests without an `Origin` (same-origin, server-to-server, curl) are
    /// always allowed. Otherwise the origin must match an entry exactly.
    pub fn is_allowed(&self, origin: Option<&str>) -> bool {
        match origin {
            None => true,
            Some(origin) => self.origins.contains(origin),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    fn header_values(&self) -> Vec<HeaderValue> {
        self.origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!(origin = %o, error = %e, "Skipping origin that is not a valid header value");
                    None
                }
            })
            .collect()
    }
}

/// Reject requests from origins outside the allow-list.
///
/// The rejection is a plain-text 403, never a JSON body, and the inner
/// service is not called.
pub async fn origin_gate_middleware(
    State(allow_list): State<OriginAllowList>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // An empty `Origin` counts as absent.
    let origin_header = request.headers().get(ORIGIN).filter(|v| !v.is_empty());
    let allowed = match origin_header {
        None => true,
        // A non-UTF-8 origin can never equal a configured entry.
        Some(value) => value
            .to_str()
            .map(|origin| allow_list.is_allowed(Some(origin)))
            .unwrap_or(false),
    };

    if allowed {
        return next.run(request).await;
    }

    let origin = request
        .headers()
        .get(ORIGIN)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .unwrap_or_default();
    warn!(
        origin = %origin,
        method = %request.method(),
        path = %request.uri().path(),
        "CORS rejected request from disallowed origin"
    );

    (
        StatusCode::FORBIDDEN,
        format!("CORS not allowed for this origin: {}", origin),
    )
        .into_response()
}

/// CORS headers for allowed origins: `GET`/`POST`, credentials, and whatever
/// request headers the preflight asks for.
pub fn cors_layer(allow_list: &OriginAllowList) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allow_list.header_values()))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_REQUEST_METHOD},
        middleware::from_fn_with_state,
        routing::get,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    const FRONTEND: &str = "http://localhost:3000";

    fn app() -> Router {
        let allow_list = OriginAllowList::new([FRONTEND]);
        Router::new()
            .route("/", get(|| async { "reached" }))
            .layer(cors_layer(&allow_list))
            .layer(from_fn_with_state(allow_list, origin_gate_middleware))
    }

    fn request(method: Method, origin: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri("/");
        if let Some(origin) = origin {
            builder = builder.header(ORIGIN, origin);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn absent_origin_is_allowed() {
        let allow_list = OriginAllowList::new([FRONTEND]);
        assert!(allow_list.is_allowed(None));
    }

    #[test]
    fn membership_is_exact() {
        let allow_list = OriginAllowList::new([FRONTEND]);
        assert!(allow_list.is_allowed(Some(FRONTEND)));
        assert!(!allow_list.is_allowed(Some("http://localhost:3000/")));
        assert!(!allow_list.is_allowed(Some("http://LOCALHOST:3000")));
        assert!(!allow_list.is_allowed(Some("https://evil.example")));
    }

    #[tokio::test]
    async fn allowed_origin_reaches_route_with_cors_headers() {
        let response = app()
            .oneshot(request(Method::GET, Some(FRONTEND)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            FRONTEND
        );
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"reached");
    }

    #[tokio::test]
    async fn missing_origin_reaches_route() {
        let response = app().oneshot(request(Method::GET, None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn empty_origin_is_treated_as_absent() {
        let response = app().oneshot(request(Method::GET, Some(""))).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"reached");
    }

    #[tokio::test]
    async fn disallowed_origin_is_rejected_before_routing() {
        let response = app()
            .oneshot(request(Method::GET, Some("https://evil.example")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(
            &body[..],
            b"CORS not allowed for this origin: https://evil.example"
        );
    }

    #[tokio::test]
    async fn disallowed_preflight_is_rejected() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/")
            .header(ORIGIN, "https://evil.example")
            .header(ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn allowed_preflight_is_answered() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/")
            .header(ORIGIN, FRONTEND)
            .header(ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();

        assert!(response.status().is_success());
        assert_eq!(
            response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            FRONTEND
        );
    }
}
