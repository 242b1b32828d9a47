//! Router assembly and the standard middleware stack.

use crate::handlers::{self, auth, notes};
use crate::state::AppState;
use axum::extract::{MatchedPath, Request};
use axum::http::header::HeaderName;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use log::Level;
use std::time::Instant;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

pub const REQUEST_ID_HEADER: &str = "x-request-id";
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Builds the full application router over `state`.
pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/", get(notes::home))
        .route("/notes/", get(notes::list))
        .route("/add/", get(notes::add_form).post(notes::add))
        .route("/note/:slug/", get(notes::detail))
        .route("/edit/:slug/", get(notes::edit_form).post(notes::edit))
        .route(
            "/delete/:slug/",
            get(notes::delete_confirm)
                .post(notes::delete)
                .delete(notes::delete),
        )
        .route("/done/", get(notes::success))
        .route("/auth/login/", get(auth::login_form).post(auth::login))
        .route("/auth/logout/", get(auth::logout).post(auth::logout))
        .route("/auth/signup/", get(auth::signup_form).post(auth::signup))
        .fallback(handlers::fallback)
        .with_state(state);

    apply_standard_layers(router)
}

/// Request logging, body limit and request-id propagation.
pub fn apply_standard_layers(router: Router) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    router
        .layer(middleware::from_fn(log_request))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    // Route pattern only; concrete paths carry slugs.
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "-".to_string(), |path| path.as_str().to_string());
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let http_status = response.status();
    let (level, status) = if http_status.is_server_error() {
        (Level::Error, "error")
    } else {
        (Level::Info, "ok")
    };
    log::log!(
        level,
        "event=http_request module=web status={status} method={method} route={route} http_status={} duration_ms={} request_id={request_id}",
        http_status.as_u16(),
        started.elapsed().as_millis()
    );
    response
}

#[cfg(test)]
mod tests {
    use super::{apply_standard_layers, REQUEST_ID_HEADER};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    #[tokio::test]
    async fn standard_layers_set_request_id_header() {
        let router = apply_standard_layers(Router::new().route("/", get(|| async { StatusCode::OK })));

        let response = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(REQUEST_ID_HEADER).is_some());
    }

    #[tokio::test]
    async fn standard_layers_keep_incoming_request_id() {
        let router = apply_standard_layers(Router::new().route("/", get(|| async { StatusCode::OK })));

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(REQUEST_ID_HEADER, "req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers().get(REQUEST_ID_HEADER).unwrap(), "req-42");
    }
}
