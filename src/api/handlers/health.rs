use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use sqlx::{Connection, PgPool};
use tracing::{error, info_span, Instrument};

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Database is healthy"),
        (status = 503, description = "Database is unhealthy")
    ),
    tag = "health"
)]
// axum handler for health
pub async fn health(pool: Extension<PgPool>) -> impl IntoResponse {
    let acquire_span = info_span!(
        "db.acquire",
        db.system = "postgresql",
        db.operation = "ACQUIRE"
    );
    let database = match pool.0.acquire().instrument(acquire_span).await {
        Ok(mut conn) => {
            let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
            match conn.ping().instrument(ping_span).await {
                Ok(()) => Ok(()),
                Err(error) => {
                    error!("Failed to ping database: {}", error);

                    Err(())
                }
            }
        }

        Err(error) => {
            error!("Failed to acquire database connection: {}", error);

            Err(())
        }
    };

    let (status, database) = match database {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(()) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
    };

    let body = Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
    }));

    (status, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::Response;
    use sqlx::postgres::PgPoolOptions;
    use std::time::Duration;

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_unreachable_database() {
        // Short acquire timeout keeps the test fast; nothing listens on the
        // DSN below.
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(100))
            .connect_lazy("postgres://postgres@127.0.0.1:1/postgres")
            .unwrap();

        let response = health(Extension(pool)).await.into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_text(response).await;
        assert!(body.contains("\"name\":\"verilink\""));
        assert!(body.contains("\"database\":\"unavailable\""));
    }
}
