use crate::{
    data::{
        sort::{SortQuery, StudentSort},
        student::Student,
    },
    error::{RosterError, RosterResult},
    routes::sse::SseEvent,
    state::RosterState,
    validation::{StudentSubmission, parse_student_id, validate_changes, validate_new},
};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Average {
    pub average: f64,
}

fn read_submission(
    body: Result<Json<StudentSubmission>, JsonRejection>,
) -> RosterResult<StudentSubmission> {
    match body {
        Ok(Json(submission)) => Ok(submission),
        //without a JSON content type nothing gets parsed, so every field is just missing
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(StudentSubmission::default()),
        Err(source) => Err(RosterError::MalformedBody { source }),
    }
}

pub async fn post_student(
    State(state): State<RosterState>,
    body: Result<Json<StudentSubmission>, JsonRejection>,
) -> RosterResult<(StatusCode, Json<Message>)> {
    let submission = read_submission(body)?;
    let new_student =
        validate_new(&submission).map_err(|errors| RosterError::Validation { errors })?;
    let id = new_student.id;

    state.insert(new_student).await?;
    info!(id, "Added student");
    state.send_sse_event(SseEvent::StudentsChanged);

    Ok((
        StatusCode::CREATED,
        Json(Message {
            message: "Student added successfully",
        }),
    ))
}

pub async fn get_students(
    State(state): State<RosterState>,
    Query(query): Query<SortQuery>,
) -> RosterResult<Json<Vec<Student>>> {
    let sort = StudentSort::try_from(query)?;
    Ok(Json(state.get_all(sort).await?))
}

pub async fn get_average(State(state): State<RosterState>) -> RosterResult<Json<Average>> {
    Ok(Json(Average {
        average: state.average_score().await?,
    }))
}

pub async fn put_student(
    State(state): State<RosterState>,
    Path(id): Path<String>,
    body: Result<Json<StudentSubmission>, JsonRejection>,
) -> RosterResult<Json<Message>> {
    let submission = read_submission(body)?;
    let changes =
        validate_changes(&submission).map_err(|errors| RosterError::Validation { errors })?;
    let id = parse_student_id(&id)?;

    state.update(id, changes).await?;
    info!(id, "Updated student");
    state.send_sse_event(SseEvent::StudentsChanged);

    Ok(Json(Message {
        message: "Student updated successfully",
    }))
}

pub async fn delete_student(
    State(state): State<RosterState>,
    Path(id): Path<String>,
) -> RosterResult<Json<Message>> {
    let id = parse_student_id(&id)?;
    state.remove(id).await?;
    info!(id, "Deleted student");
    state.send_sse_event(SseEvent::StudentsChanged);

    Ok(Json(Message {
        message: "Student deleted successfully",
    }))
}

#[cfg(test)]
mod tests {
    use crate::{
        data::{memory::MemoryStudentStore, student::Student},
        routes::router,
        state::RosterState,
    };
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn student(id: i32, first_name: &str, last_name: &str, score: f64) -> Student {
        Student {
            id,
            first_name: first_name.into(),
            middle_name: None,
            last_name: last_name.into(),
            score,
        }
    }

    fn app_with(students: Vec<Student>) -> (Router, Arc<MemoryStudentStore>) {
        let store = Arc::new(MemoryStudentStore::with_students(students));
        (router(RosterState::new(store.clone())), store)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn ada() -> Value {
        json!({
            "firstName": "Ada",
            "middleName": "King",
            "lastName": "Lovelace",
            "studentId": 3,
            "score": 88.5
        })
    }

    #[tokio::test]
    async fn created_student_is_listed_once() {
        let (app, _) = app_with(vec![]);

        let (status, body) = send(&app, Method::POST, "/api/students", Some(ada())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({"message": "Student added successfully"}));

        let (status, body) = send(&app, Method::GET, "/api/students", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{
                "id": 3,
                "first_name": "Ada",
                "middle_name": "King",
                "last_name": "Lovelace",
                "score": 88.5
            }])
        );
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected_and_not_stored() {
        let (app, store) = app_with(vec![]);

        let (status, _) = send(&app, Method::POST, "/api/students", Some(ada())).await;
        assert_eq!(status, StatusCode::CREATED);

        let mut second = ada();
        second["firstName"] = json!("Someone Else");
        let (status, body) = send(&app, Method::POST, "/api/students", Some(second)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Student ID already exists"}));

        let rows = store.snapshot();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].first_name, "Ada");
    }

    #[tokio::test]
    async fn invalid_submission_never_reaches_storage() {
        let (app, store) = app_with(vec![]);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/students",
            Some(json!({
                "firstName": "Ada",
                "lastName": "Lovelace",
                "studentId": 11,
                "score": 101
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"errors": [
                {"path": "studentId", "msg": "Student ID must be between 1 and 10"},
                {"path": "score", "msg": "Score must be between 0 and 100"}
            ]})
        );
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn average_of_nothing_is_zero() {
        let (app, _) = app_with(vec![]);

        let (status, body) = send(&app, Method::GET, "/api/students/average", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"average": 0.0}));
    }

    #[tokio::test]
    async fn average_is_the_mean_score() {
        let (app, _) = app_with(vec![student(1, "A", "B", 70.0), student(2, "C", "D", 80.0)]);

        let (_, body) = send(&app, Method::GET, "/api/students/average", None).await;
        assert_eq!(body, json!({"average": 75.0}));
    }

    #[tokio::test]
    async fn list_sorts_by_score_descending() {
        let (app, _) = app_with(vec![
            student(1, "A", "B", 60.0),
            student(2, "C", "D", 95.0),
            student(3, "E", "F", 75.0),
            student(4, "G", "H", 95.0),
        ]);

        let (status, body) =
            send(&app, Method::GET, "/api/students?sortBy=score&order=desc", None).await;
        assert_eq!(status, StatusCode::OK);

        let scores: Vec<f64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["score"].as_f64().unwrap())
            .collect();
        assert_eq!(scores, [95.0, 95.0, 75.0, 60.0]);
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[tokio::test]
    async fn list_sorts_by_last_name() {
        let (app, _) = app_with(vec![
            student(1, "Grace", "Hopper", 60.0),
            student(2, "Ada", "Lovelace", 95.0),
            student(3, "Alan", "Turing", 75.0),
            student(4, "Edsger", "Dijkstra", 95.0),
        ]);

        let (_, body) = send(&app, Method::GET, "/api/students?sortBy=last_name", None).await;
        let ids: Vec<i64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, [4, 1, 2, 3]);
    }

    #[tokio::test]
    async fn list_rejects_unknown_sort_field() {
        let (app, _) = app_with(vec![]);

        let (status, body) = send(&app, Method::GET, "/api/students?sortBy=dob", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Invalid sort field"}));
    }

    #[tokio::test]
    async fn update_overwrites_mutable_fields() {
        let (app, store) = app_with(vec![student(5, "Alan", "Turing", 40.0)]);

        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/students/5",
            Some(json!({
                "firstName": "Alan",
                "middleName": "Mathison",
                "lastName": "Turing",
                "studentId": 9,
                "score": "99"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Student updated successfully"}));

        let rows = store.snapshot();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 5);
        assert_eq!(rows[0].middle_name.as_deref(), Some("Mathison"));
        assert!((rows[0].score - 99.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn update_of_missing_student_changes_nothing() {
        let (app, store) = app_with(vec![student(1, "A", "B", 50.0)]);

        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/students/2",
            Some(json!({"firstName": "X", "lastName": "Y", "score": 10})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Student not found"}));
        assert_eq!(store.snapshot(), vec![student(1, "A", "B", 50.0)]);
    }

    #[tokio::test]
    async fn update_validates_before_lookup() {
        let (app, _) = app_with(vec![]);

        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/students/2",
            Some(json!({"firstName": "", "lastName": "Y", "score": 10})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"errors": [{"path": "firstName", "msg": "First name is required"}]})
        );
    }

    #[tokio::test]
    async fn delete_removes_exactly_one_row() {
        let (app, store) = app_with(vec![student(1, "A", "B", 50.0), student(2, "C", "D", 60.0)]);

        let (status, body) = send(&app, Method::DELETE, "/api/students/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Student deleted successfully"}));
        assert_eq!(store.snapshot(), vec![student(2, "C", "D", 60.0)]);

        let (status, body) = send(&app, Method::DELETE, "/api/students/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Student not found"}));
        assert_eq!(store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn wrongly_typed_fields_are_field_errors() {
        let (app, store) = app_with(vec![]);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/students",
            Some(json!({"firstName": "A", "lastName": "B", "studentId": true, "score": 50})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"errors": [{"path": "studentId", "msg": "Student ID must be between 1 and 10"}]})
        );

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/students",
            Some(json!({"firstName": 123, "lastName": "B", "studentId": 1, "score": 50})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"errors": [{"path": "firstName", "msg": "First name is required"}]})
        );

        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/students/1",
            Some(json!({"firstName": "A", "lastName": false, "score": "50"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn body_without_content_type_has_no_fields() {
        let (app, store) = app_with(vec![]);

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/students")
            .body(Body::from(ada().to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        let paths: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["path"].as_str().unwrap())
            .collect();
        assert_eq!(paths, ["firstName", "lastName", "studentId", "score"]);
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn unparseable_json_is_a_json_error() {
        let (app, _) = app_with(vec![]);

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/students")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"firstName\": "))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"error": "Malformed request body"}));
    }

    #[tokio::test]
    async fn unparseable_path_ids_are_not_found() {
        let (app, store) = app_with(vec![student(1, "A", "B", 50.0)]);

        for uri in ["/api/students/abc", "/api/students/99999999999"] {
            let (status, body) = send(&app, Method::DELETE, uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "DELETE {uri}");
            assert_eq!(body, json!({"error": "Student not found"}));

            let (status, body) = send(
                &app,
                Method::PUT,
                uri,
                Some(json!({"firstName": "X", "lastName": "Y", "score": 10})),
            )
            .await;
            assert_eq!(status, StatusCode::NOT_FOUND, "PUT {uri}");
            assert_eq!(body, json!({"error": "Student not found"}));
        }

        //a bad body is still reported before the id
        let (status, _) = send(&app, Method::PUT, "/api/students/abc", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(store.snapshot(), vec![student(1, "A", "B", 50.0)]);
    }

    #[tokio::test]
    async fn mutations_publish_change_events() {
        let store = Arc::new(MemoryStudentStore::default());
        let state = RosterState::new(store);
        let mut rx = state.subscribe_to_sse_feed();
        let app = router(state);

        let (status, _) = send(&app, Method::POST, "/api/students", Some(ada())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(rx.try_recv().is_ok());

        let (status, _) = send(&app, Method::DELETE, "/api/students/7", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(rx.try_recv().is_err());
    }
}
