//! Response hardening applied to every route.

use std::any::Any;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::response::Envelope;

#[derive(Debug, Clone, Copy)]
pub struct SecurityPolicy {
    /// Only meaningful behind HTTPS, so production only.
    pub hsts: bool,
}

pub async fn security_headers(
    State(policy): State<SecurityPolicy>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        "Permissions-Policy",
        HeaderValue::from_static("geolocation=(), microphone=(), camera=()"),
    );
    if policy.hsts {
        headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }
    response
}

/// Renders a handler panic as a 500 envelope; the panic text is echoed only
/// when `expose_detail` is set.
pub fn panic_response(err: Box<dyn Any + Send + 'static>, expose_detail: bool) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "handler panicked");

    let mut body = Envelope::failure("Internal server error");
    if expose_detail {
        body = body.with_error(detail);
    }
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(res: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn panic_detail_only_outside_production() {
        let dev = panic_response(Box::new("boom"), true);
        assert_eq!(dev.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(dev).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "boom");

        let prod = body_json(panic_response(Box::new(String::from("boom")), false)).await;
        assert!(prod.get("error").is_none());
        assert_eq!(prod["message"], "Internal server error");
    }
}
