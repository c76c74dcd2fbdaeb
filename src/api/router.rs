//! Portal API router.
//!
//! Returns a composable `Router` with all routes nested under `/api`.
//! Authentication is handled by the deployment's front proxy; handlers
//! receive the caller's user id directly.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

pub fn api_router(ctx: ApiContext) -> Router {
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route(
            "/appointments",
            post(endpoints::appointments::book).get(endpoints::appointments::list),
        )
        .route("/appointments/slots", get(endpoints::appointments::slots))
        .route(
            "/appointments/:id/cancel",
            post(endpoints::appointments::cancel),
        )
        .route(
            "/appointments/:id/reschedule",
            post(endpoints::appointments::reschedule),
        )
        .route(
            "/appointments/:id/complete",
            post(endpoints::appointments::complete),
        )
        .route(
            "/requests",
            post(endpoints::requests::submit).get(endpoints::requests::list),
        )
        .route("/requests/:id/advance", post(endpoints::requests::advance))
        .route("/requests/:id/download", get(endpoints::requests::download))
        .route("/notifications", get(endpoints::notifications::list))
        .route(
            "/notifications/:id/read",
            post(endpoints::notifications::mark_read),
        )
        .route(
            "/payments",
            get(endpoints::payments::list).post(endpoints::payments::record),
        )
        .route("/payments/:id/settle", post(endpoints::payments::settle))
        .route("/payments/:id/checkout", post(endpoints::payments::checkout))
        .route("/admin/assets/logo", post(endpoints::admin::upload_logo))
        .route("/admin/assets", get(endpoints::admin::assets))
        .with_state(ctx);

    Router::new().nest("/api", api).layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use base64::Engine;
    use chrono::{Days, Local};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::api::types::testing::test_context;
    use crate::db::repository::insert_user;
    use crate::models::{User, UserRole};

    const PDF_BYTES: &[u8] = b"%PDF-1.4 supporting document";

    /// Router + seeded parishioner. Keep the tempdir guard alive.
    fn test_app() -> (Router, ApiContext, tempfile::TempDir, Uuid) {
        let (ctx, dir) = test_context();
        let conn = ctx.open_db().unwrap();
        let user = User {
            id: Uuid::new_v4(),
            name: "Clara Mendoza".into(),
            email: "clara@example.org".into(),
            role: UserRole::Parishioner,
        };
        insert_user(&conn, &user).unwrap();
        let app = api_router(ctx.clone());
        (app, ctx, dir, user.id)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn response_json(response: axum::http::Response<Body>) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 65536).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn bookable_date() -> String {
        (Local::now().date_naive() + Days::new(2)).to_string()
    }

    fn booking_body(user_id: Uuid) -> serde_json::Value {
        serde_json::json!({
            "user_id": user_id,
            "booking_type": "baptism",
            "date": bookable_date(),
            "time": "10:00",
            "purpose": "Need baptism certificate"
        })
    }

    async fn book(app: &Router, user_id: Uuid) -> Uuid {
        let response = app
            .clone()
            .oneshot(post_json("/api/appointments", booking_body(user_id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["status"], "pending");
        json["appointment_id"].as_str().unwrap().parse().unwrap()
    }

    #[tokio::test]
    async fn health_reports_schema() {
        let (app, _ctx, _dir, _user) = test_app();
        let response = app.oneshot(get_request("/api/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["tables"], 8);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let (app, _ctx, _dir, _user) = test_app();
        let response = app.oneshot(get_request("/api/nonexistent")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn slots_expose_the_half_hour_grid() {
        let (app, _ctx, _dir, _user) = test_app();
        let response = app.oneshot(get_request("/api/appointments/slots")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        let slots = json["slots"].as_array().unwrap();
        assert_eq!(slots.len(), 16);
        assert_eq!(slots[0], "09:00");
        assert_eq!(slots[15], "16:30");
    }

    #[tokio::test]
    async fn booking_then_listing_round_trip() {
        let (app, _ctx, _dir, user_id) = test_app();
        book(&app, user_id).await;

        let response = app
            .oneshot(get_request(&format!("/api/appointments?user_id={user_id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["appointments"].as_array().unwrap().len(), 1);
        assert_eq!(json["appointments"][0]["status"], "pending");
    }

    #[tokio::test]
    async fn booking_past_date_rejected_with_validation_code() {
        let (app, _ctx, _dir, user_id) = test_app();
        let mut body = booking_body(user_id);
        body["date"] = serde_json::json!(Local::now().date_naive().to_string());

        let response = app.oneshot(post_json("/api/appointments", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION");
    }

    #[tokio::test]
    async fn second_cancel_conflicts() {
        let (app, _ctx, _dir, user_id) = test_app();
        let id = book(&app, user_id).await;
        let cancel_body = serde_json::json!({"reason": "schedule conflict"});

        let first = app
            .clone()
            .oneshot(post_json(&format!("/api/appointments/{id}/cancel"), cancel_body.clone()))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app
            .oneshot(post_json(&format!("/api/appointments/{id}/cancel"), cancel_body))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
        let json = response_json(second).await;
        assert_eq!(json["error"]["code"], "ALREADY_TERMINAL");
    }

    #[tokio::test]
    async fn reschedule_cancelled_booking_conflicts() {
        let (app, _ctx, _dir, user_id) = test_app();
        let id = book(&app, user_id).await;
        app.clone()
            .oneshot(post_json(
                &format!("/api/appointments/{id}/cancel"),
                serde_json::json!({"reason": "conflict"}),
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(post_json(
                &format!("/api/appointments/{id}/reschedule"),
                serde_json::json!({"date": bookable_date(), "time": "11:00", "reason": "retry"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn cancel_unknown_booking_is_404() {
        let (app, _ctx, _dir, _user) = test_app();
        let response = app
            .oneshot(post_json(
                &format!("/api/appointments/{}/cancel", Uuid::new_v4()),
                serde_json::json!({"reason": "x"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    fn request_body(user_id: Uuid) -> serde_json::Value {
        serde_json::json!({
            "user_id": user_id,
            "document_kind": "baptismal_certificate",
            "purpose": "For school enrollment",
            "files": [{
                "name": "birth_record.pdf",
                "file_type": "pdf",
                "data": base64::engine::general_purpose::STANDARD.encode(PDF_BYTES)
            }]
        })
    }

    #[tokio::test]
    async fn document_request_submission_and_advance() {
        let (app, _ctx, _dir, user_id) = test_app();

        let response = app
            .clone()
            .oneshot(post_json("/api/requests", request_body(user_id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        let id = json["request_id"].as_str().unwrap().to_string();

        for expected in ["processing", "ready", "picked_up"] {
            let response = app
                .clone()
                .oneshot(post_json(&format!("/api/requests/{id}/advance"), serde_json::json!({})))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let json = response_json(response).await;
            assert_eq!(json["status"], expected);
        }

        let response = app
            .oneshot(post_json(&format!("/api/requests/{id}/advance"), serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn short_purpose_submission_rejected() {
        let (app, _ctx, _dir, user_id) = test_app();
        let mut body = request_body(user_id);
        body["purpose"] = serde_json::json!("8 chars.");

        let response = app.oneshot(post_json("/api/requests", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION");
    }

    #[tokio::test]
    async fn unsupported_file_type_rejected() {
        let (app, _ctx, _dir, user_id) = test_app();
        let mut body = request_body(user_id);
        body["files"][0]["file_type"] = serde_json::json!("exe");

        let response = app.oneshot(post_json("/api/requests", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn download_is_explicitly_unimplemented() {
        let (app, _ctx, _dir, _user) = test_app();
        let response = app
            .oneshot(get_request(&format!("/api/requests/{}/download", Uuid::new_v4())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "NOT_IMPLEMENTED");
    }

    #[tokio::test]
    async fn checkout_is_explicitly_unimplemented() {
        let (app, _ctx, _dir, _user) = test_app();
        let response = app
            .oneshot(post_json(
                &format!("/api/payments/{}/checkout", Uuid::new_v4()),
                serde_json::json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    }

    #[tokio::test]
    async fn payment_record_and_settle_flow() {
        let (app, _ctx, _dir, user_id) = test_app();
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/payments",
                serde_json::json!({
                    "user_id": user_id,
                    "description": "Baptismal certificate fee",
                    "amount_cents": 15000
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        let id = json["payment_id"].as_str().unwrap().to_string();

        let settle = app
            .clone()
            .oneshot(post_json(&format!("/api/payments/{id}/settle"), serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(settle.status(), StatusCode::OK);

        // Settling twice conflicts
        let again = app
            .oneshot(post_json(&format!("/api/payments/{id}/settle"), serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(again.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn notifications_accumulate_per_action() {
        let (app, _ctx, _dir, user_id) = test_app();
        let id = book(&app, user_id).await;
        app.clone()
            .oneshot(post_json(
                &format!("/api/appointments/{id}/cancel"),
                serde_json::json!({"reason": "conflict"}),
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(get_request(&format!("/api/notifications?user_id={user_id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["notifications"].as_array().unwrap().len(), 2);
        assert_eq!(json["unread"], 2);
    }

    #[tokio::test]
    async fn logo_upload_round_trip() {
        let (app, _ctx, _dir, _user) = test_app();
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/admin/assets/logo",
                serde_json::json!({
                    "file_name": "parish_logo.png",
                    "file_type": "png",
                    "data": base64::engine::general_purpose::STANDARD.encode(png)
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(get_request("/api/admin/assets")).await.unwrap();
        let json = response_json(response).await;
        assert_eq!(json["assets"].as_array().unwrap().len(), 1);
        assert_eq!(json["assets"][0]["name"], "logo");
    }

    #[tokio::test]
    async fn logo_rejects_non_image_type() {
        let (app, _ctx, _dir, _user) = test_app();
        let response = app
            .oneshot(post_json(
                "/api/admin/assets/logo",
                serde_json::json!({
                    "file_name": "logo.pdf",
                    "file_type": "pdf",
                    "data": base64::engine::general_purpose::STANDARD.encode(b"%PDF")
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
