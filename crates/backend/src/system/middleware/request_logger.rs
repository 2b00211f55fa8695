use axum::body::{to_bytes, Body};
use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use uuid::Uuid;

use crate::shared::format::format_size;

/// Middleware для логирования HTTP запросов
///
/// Каждому запросу выдаётся id (заголовок `x-request-id`), под которым
/// пишутся и логи обработчика. В итоговой строке:
/// статус, метод, путь, длительность и размер ответа.
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("request", id = %request_id);
    log_request(req, next, request_id).instrument(span).await
}

async fn log_request(req: Request<Body>, next: Next, request_id: Uuid) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    let (mut parts, body) = response.into_parts();
    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        parts.headers.insert("x-request-id", value);
    }

    // Читаем тело ответа, чтобы узнать реальный размер
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(
                "{} {} {} | {}ms | body error: {}",
                parts.status.as_u16(),
                method,
                path,
                start.elapsed().as_millis(),
                e
            );
            return Response::from_parts(parts, Body::default());
        }
    };

    let status = parts.status;
    let duration = start.elapsed().as_millis();
    let size = format_size(bytes.len());

    if status.is_server_error() {
        tracing::error!("{} {} {} | {}ms | {}", status.as_u16(), method, path, duration, size);
    } else if status.is_client_error() {
        tracing::warn!("{} {} {} | {}ms | {}", status.as_u16(), method, path, duration, size);
    } else {
        tracing::info!("{} {} {} | {}ms | {}", status.as_u16(), method, path, duration, size);
    }

    Response::from_parts(parts, Body::from(bytes))
}
