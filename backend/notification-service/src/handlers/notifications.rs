/// Notification HTTP handlers
use crate::error::AppError;
use crate::models::SendNotificationRequest;
use crate::services::NotificationProducer;
use actix_web::{web, HttpResponse};
use std::sync::Arc;

/// Create and broadcast a notification
///
/// POST /api/notifications/send
pub async fn send_notification(
    producer: web::Data<Arc<NotificationProducer>>,
    req: web::Json<SendNotificationRequest>,
) -> Result<HttpResponse, AppError> {
    let response = producer.send(req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Malformed bodies answer with the same JSON error shape as every other failure
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

/// Register routes
pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/notifications")
            .app_data(json_config())
            .route("/send", web::post().to(send_notification)),
    );
}
