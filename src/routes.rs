use crate::state::RosterState;
use axum::{
    Router,
    routing::{delete, get, put},
};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

pub mod api;
pub mod index;
pub mod sse;
pub mod students_view;

const MAX_BODY_BYTES: usize = 64 * 1024;

pub fn router(state: RosterState) -> Router {
    Router::new()
        .route("/", get(index::get_index_route))
        .route(
            "/api/students",
            get(api::get_students).post(api::post_student),
        )
        .route("/api/students/average", get(api::get_average))
        .route(
            "/api/students/{id}",
            put(api::put_student).delete(api::delete_student),
        )
        .route(
            "/internal/students",
            get(students_view::internal_get_students),
        )
        .route(
            "/internal/students/form",
            get(students_view::internal_get_student_form)
                .post(students_view::internal_post_student),
        )
        .route(
            "/internal/students/form/{id}",
            put(students_view::internal_put_student),
        )
        .route(
            "/internal/students/{id}",
            delete(students_view::internal_delete_student),
        )
        .route("/sse_feed", get(sse::sse_feed))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
