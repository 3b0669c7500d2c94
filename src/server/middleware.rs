use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;

/// Middleware that attaches a request ID to every request.
///
/// - Respects an incoming `x-request-id` header if present.
/// - Otherwise generates a UUID v4.
/// - Creates a tracing span so all downstream logs include the request ID.
/// - Returns the request ID in the response `x-request-id` header.
pub async fn request_id(request: Request<axum::body::Body>, next: Next) -> Response {
    let id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let rid = id.clone();
    async move {
        let mut response = next.run(request).await;
        if let Ok(value) = rid.parse() {
            response.headers_mut().insert("x-request-id", value);
        }
        response
    }
    .instrument(tracing::info_span!("request", request_id = %id))
    .await
}
