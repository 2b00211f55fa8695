use axum::{
    http::{header, Method},
    middleware,
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::api::handlers;
use crate::shared::state::AppState;
use crate::system::middleware::request_logger::request_logger;

/// Конфигурация всех роутов приложения
pub fn configure_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        // D402 Top customers by sales (report 272 through the LLM)
        .route(
            "/api/customers/top/:year/:month",
            get(handlers::d402_top_customers::get_top_customers),
        )
        .with_state(state)
}

/// Роуты вместе с логированием запросов и CORS
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    configure_routes(state)
        .layer(middleware::from_fn(request_logger))
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::d402_top_customers::service::tests::{settings, StubProvider, StubReply};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use serde_json::Value;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(provider: Arc<StubProvider>) -> Router {
        build_app(AppState::new(provider, settings()))
    }

    fn stub(reply: &str) -> Arc<StubProvider> {
        Arc::new(StubProvider::new(StubReply::Text(reply.to_string())))
    }

    async fn send_get(app: Router, uri: &str) -> Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_has_request_id() {
        let response = send_get(app(stub("[]")), "/health").await;

        assert_eq!(response.status(), StatusCode::OK);
        let id = response.headers().get("x-request-id").unwrap().to_str().unwrap();
        assert_eq!(id.len(), 36);

        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_top_customers_success() {
        let provider = stub(r#"[{"name":"Beta","sales":5},{"name":"Acme","sales":10}]"#);

        let response = send_get(app(provider.clone()), "/api/customers/top/2025/9?limit=1").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["count"], 1);
        assert_eq!(body["customers"][0]["name"], "Acme");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_bad_month_is_json_400() {
        let provider = stub("[]");

        let response = send_get(app(provider.clone()), "/api/customers/top/2025/13").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["errorKind"], "InputMalformed");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_utf8_path_is_json_400() {
        let provider = stub("[]");

        let response = send_get(app(provider.clone()), "/api/customers/top/%FF/9").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["errorKind"], "InputMalformed");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_duplicate_limit_uses_first() {
        let provider = stub(r#"[{"name":"A","sales":3},{"name":"B","sales":2},{"name":"C","sales":1}]"#);

        let response = send_get(app(provider.clone()), "/api/customers/top/2025/9?limit=1&limit=2").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["count"], 1);
        let prompts = provider.prompts.lock().unwrap();
        assert!(prompts[0].contains("top 1 customers"));
    }

    #[tokio::test]
    async fn test_overflowing_limit_is_json_400() {
        let provider = stub("[]");

        let response = send_get(
            app(provider.clone()),
            "/api/customers/top/2025/9?limit=99999999999999999999",
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["errorKind"], "InputMalformed");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/customers/top/2025/9")
            .header(header::ORIGIN, "http://localhost:8080")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap();

        let response = app(stub("[]")).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
        let methods = response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_METHODS)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(methods.contains("GET"));
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = send_get(app(stub("[]")), "/api/customers/top/2025").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
