use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

const MAX_REQUEST_ID_LEN: usize = 64;

/// Id of the current request, available as a request extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// Reuse the caller's `x-request-id` when it is well formed, otherwise
/// generate one. The id is echoed on the response.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = incoming_request_id(request.headers())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }
    response
}

fn incoming_request_id(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(X_REQUEST_ID)?.to_str().ok()?.trim();
    let well_formed = !value.is_empty()
        && value.len() <= MAX_REQUEST_ID_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    well_formed.then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, extract::Extension, middleware, routing::get, Router};
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route(
                "/",
                get(|Extension(id): Extension<RequestId>| async move { id.0 }),
            )
            .layer(middleware::from_fn(request_id_middleware))
    }

    async fn call(request_id: Option<&str>) -> (String, String) {
        let mut request = axum::http::Request::builder().uri("/");
        if let Some(id) = request_id {
            request = request.header(X_REQUEST_ID, id);
        }
        let response = app()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let header = response.headers()[X_REQUEST_ID]
            .to_str()
            .unwrap()
            .to_string();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (header, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_generates_id_when_missing() {
        let (header, seen_by_handler) = call(None).await;
        assert_eq!(header, seen_by_handler);
        assert!(Uuid::parse_str(&header).is_ok());
    }

    #[tokio::test]
    async fn test_propagates_caller_id() {
        let (header, seen_by_handler) = call(Some("trace-42_abc")).await;
        assert_eq!(header, "trace-42_abc");
        assert_eq!(seen_by_handler, "trace-42_abc");
    }

    #[tokio::test]
    async fn test_replaces_malformed_caller_id() {
        let (header, _) = call(Some("bad id; drop")).await;
        assert!(Uuid::parse_str(&header).is_ok());

        let (header, _) = call(Some(&"x".repeat(65))).await;
        assert!(Uuid::parse_str(&header).is_ok());
    }
}
