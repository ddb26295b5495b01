//! Extractors whose rejections render as `AppError` bodies instead of
//! axum's plain-text defaults.

use axum::{
    extract::{FromRequest, FromRequestParts},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::AppError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct Query<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct Path<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::post, Router};
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use tower::ServiceExt;
    use uuid::Uuid;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[allow(dead_code)]
        steps: i32,
    }

    #[derive(Debug, Deserialize)]
    struct Window {
        #[allow(dead_code)]
        start_date: Option<time::Date>,
    }

    fn app() -> Router {
        Router::new()
            .route("/body", post(|Json(_p): Json<Payload>| async { "ok" }))
            .route(
                "/query",
                axum::routing::get(|Query(_w): Query<Window>| async { "ok" }),
            )
            .route(
                "/path/:id",
                axum::routing::get(|Path(_id): Path<Uuid>| async { "ok" }),
            )
    }

    async fn error_code(req: Request<Body>) -> (u16, serde_json::Value) {
        let res = app().oneshot(req).await.unwrap();
        let status = res.status().as_u16();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn wrong_field_type_is_a_json_bad_request() {
        let (status, body) = error_code(
            Request::post("/body")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"steps":"lots"}"#))
                .unwrap(),
        )
        .await;
        assert_eq!(status, 400);
        assert_eq!(body["error"]["code"], "bad_request");
    }

    #[tokio::test]
    async fn broken_json_syntax_is_a_json_bad_request() {
        let (status, body) = error_code(
            Request::post("/body")
                .header("content-type", "application/json")
                .body(Body::from("{"))
                .unwrap(),
        )
        .await;
        assert_eq!(status, 400);
        assert_eq!(body["error"]["code"], "bad_request");
    }

    #[tokio::test]
    async fn unparseable_query_is_a_json_bad_request() {
        let (status, body) = error_code(
            Request::get("/query?start_date=yesterday")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, 400);
        assert_eq!(body["error"]["code"], "bad_request");
    }

    #[tokio::test]
    async fn non_uuid_path_is_a_json_bad_request() {
        let (status, body) =
            error_code(Request::get("/path/not-a-uuid").body(Body::empty()).unwrap()).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"]["code"], "bad_request");
    }
}
