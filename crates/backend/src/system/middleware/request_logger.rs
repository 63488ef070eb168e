use axum::body::to_bytes;
use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;

/// Размер ответа: B, KB, MB
pub fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{} B", bytes)
    } else if b < MB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / MB)
    }
}

/// Middleware для логирования HTTP запросов
///
/// Пишет в tracing: время (Brasília, UTC-3), длительность, размер ответа,
/// статус, метод и путь.
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;
    let (parts, body) = response.into_parts();
    let timestamp = Utc::now() - chrono::Duration::hours(3);

    // читаем тело, чтобы узнать реальный размер
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(
                "{} | {:>5}ms | {:>10} | {} {:>6} {} ({})",
                timestamp.format("%H:%M:%S"),
                start.elapsed().as_millis(),
                "error",
                parts.status.as_u16(),
                method,
                path,
                e
            );
            return Response::from_parts(parts, Body::default());
        }
    };

    let line = format!(
        "{} | {:>5}ms | {:>10} | {} {:>6} {}",
        timestamp.format("%H:%M:%S"),
        start.elapsed().as_millis(),
        format_size(bytes.len()),
        parts.status.as_u16(),
        method,
        path
    );
    if parts.status.is_server_error() {
        tracing::error!("{}", line);
    } else if parts.status.is_client_error() {
        tracing::warn!("{}", line);
    } else {
        tracing::info!("{}", line);
    }

    Response::from_parts(parts, Body::from(bytes))
}
