use crate::{
    data::{
        sort::{SortField, SortOrder, SortQuery, StudentSort},
        student::Student,
    },
    error::{HtmlResult, RosterError},
    maud_conveniences::{FormInput, error_alert, form_submit_button, render_table, title},
    routes::sse::SseEvent,
    state::RosterState,
    validation::{
        FieldError, FieldValue, StudentSubmission, parse_student_id, validate_changes,
        validate_new,
    },
};
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

/// Client-side event that makes the table (list + average) fetch itself again.
pub const STUDENTS_CHANGED_TRIGGER: &str = "students-changed";

const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this student?";

/// The raw form fields, kept as strings so a rejected form can be shown again as typed.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentForm {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub student_id: Option<String>,
    pub score: String,
}

impl From<&StudentForm> for StudentSubmission {
    fn from(form: &StudentForm) -> Self {
        Self {
            first_name: Some(FieldValue::Text(form.first_name.clone())),
            middle_name: Some(FieldValue::Text(form.middle_name.clone())),
            last_name: Some(FieldValue::Text(form.last_name.clone())),
            student_id: form.student_id.clone().map(FieldValue::Text),
            score: Some(FieldValue::Text(form.score.clone())),
        }
    }
}

impl From<Student> for StudentForm {
    fn from(student: Student) -> Self {
        Self {
            first_name: student.first_name,
            middle_name: student.middle_name.unwrap_or_default(),
            last_name: student.last_name,
            student_id: Some(student.id.to_string()),
            score: student.score.to_string(),
        }
    }
}

fn changed(state: &RosterState, markup: Markup) -> Response {
    state.send_sse_event(SseEvent::StudentsChanged);
    ([("HX-Trigger", STUDENTS_CHANGED_TRIGGER)], markup).into_response()
}

fn sort_header(sort: StudentSort, field: SortField, label: &'static str) -> Markup {
    html! {
        a class="cursor-pointer hover:text-blue-300" hx-get={"/internal/students?" (sort.clicked(field).query_string())} hx-target="#student_table" hx-swap="outerHTML" {
            (label)
            @if sort.field == field {
                @match sort.order {
                    SortOrder::Asc => { " ↑" }
                    SortOrder::Desc => { " ↓" }
                }
            }
        }
    }
}

fn student_row(student: Student) -> [Markup; 4] {
    let id = student.id;
    [
        html! {(student.full_name())},
        html! {(id)},
        html! {(student.score)},
        html! {
            div class="flex flex-row gap-2" {
                button class="bg-blue-600 hover:bg-blue-800 text-sm font-bold py-1 px-3 rounded" hx-get={"/internal/students/form?id=" (id)} hx-target="#student_form" {
                    "Edit"
                }
                button class="bg-red-600 hover:bg-red-800 text-sm font-bold py-1 px-3 rounded" hx-delete={"/internal/students/" (id)} hx-confirm=(DELETE_CONFIRMATION) hx-target="#table_feedback" {
                    "Delete"
                }
            }
        },
    ]
}

pub async fn internal_get_students(
    State(state): State<RosterState>,
    Query(query): Query<SortQuery>,
) -> HtmlResult<Markup> {
    let sort = StudentSort::try_from(query)?;
    let students = state.get_all(sort).await?;
    let average = state.average_score().await?;

    Ok(html! {
        div id="student_table" class="flex flex-col space-y-4" hx-get={"/internal/students?" (sort.query_string())} hx-trigger={(STUDENTS_CHANGED_TRIGGER) " from:body, sse:students_changed"} hx-swap="outerHTML" hx-indicator="#loading" {
            div class="bg-gray-800 p-8 rounded shadow-md" {
                (title("Statistics"))
                p id="average" {"Average Score: " (format!("{average:.2}"))}
            }
            div class="bg-gray-800 p-8 rounded shadow-md" {
                (title("Student List"))
                p id="loading" class="htmx-indicator text-center italic" {"Loading..."}
                div id="table_feedback" {}
                (render_table(
                    [
                        sort_header(sort, SortField::FirstName, "Name"),
                        sort_header(sort, SortField::Id, "ID"),
                        sort_header(sort, SortField::Score, "Score"),
                        html! {"Actions"},
                    ],
                    students.into_iter().map(student_row).collect(),
                ))
            }
        }
    })
}

fn student_form(
    editing: Option<i32>,
    values: &StudentForm,
    errors: &[FieldError],
    submit_error: Option<String>,
) -> Markup {
    let error_for = |path: &str| errors.iter().find(|e| e.path == path).map(|e| e.msg);
    let post_url = editing.is_none().then_some("/internal/students/form");
    let put_url = editing.map(|id| format!("/internal/students/form/{id}"));
    let student_id = editing.map_or_else(|| values.student_id.clone(), |id| Some(id.to_string()));

    html! {
        form hx-post=[post_url] hx-put=[put_url] hx-trigger="submit" hx-target="#student_form" hx-indicator="#saving" class="p-4" {
            @if editing.is_some() {
                (title("Edit Student"))
            } @else {
                (title("Add New Student"))
            }

            div class="grid grid-cols-1 md:grid-cols-3 gap-4" {
                (FormInput::text("firstName", "First Name", Some(values.first_name.as_str())).required().error(error_for("firstName")))
                (FormInput::text("middleName", "Middle Name", Some(values.middle_name.as_str())))
                (FormInput::text("lastName", "Last Name", Some(values.last_name.as_str())).required().error(error_for("lastName")))
            }
            div class="grid grid-cols-1 md:grid-cols-2 gap-4" {
                (FormInput::number("studentId", "Student ID", student_id.as_deref())
                    .required()
                    .range("1", "10", "1")
                    .disabled(editing.is_some())
                    .error(error_for("studentId")))
                (FormInput::number("score", "Score", Some(values.score.as_str())).required().range("0", "100", "any").error(error_for("score")))
            }

            @if let Some(submit_error) = submit_error {
                (error_alert(submit_error))
            }

            div class="flex flex-row items-center gap-2" {
                @if editing.is_some() {
                    (form_submit_button("Update Student"))
                    button type="button" class="bg-gray-600 hover:bg-gray-700 font-bold py-2 px-4 rounded" hx-get="/internal/students/form" hx-target="#student_form" {
                        "Cancel"
                    }
                } @else {
                    (form_submit_button("Add Student"))
                }
                span id="saving" class="htmx-indicator italic text-gray-400" {"Saving..."}
            }
        }
    }
}

#[derive(Deserialize)]
pub struct OptionalIdQuery {
    pub id: Option<String>,
}

pub async fn internal_get_student_form(
    State(state): State<RosterState>,
    Query(OptionalIdQuery { id }): Query<OptionalIdQuery>,
) -> HtmlResult<Markup> {
    let Some(id) = id else {
        return Ok(student_form(None, &StudentForm::default(), &[], None));
    };
    let id = parse_student_id(&id)?;

    let student = state
        .get_by_id(id)
        .await?
        .ok_or(RosterError::MissingStudent { id })?;
    Ok(student_form(Some(id), &StudentForm::from(student), &[], None))
}

pub async fn internal_post_student(
    State(state): State<RosterState>,
    Form(form): Form<StudentForm>,
) -> HtmlResult<Response> {
    let new_student = match validate_new(&StudentSubmission::from(&form)) {
        Ok(new_student) => new_student,
        Err(errors) => return Ok(student_form(None, &form, &errors, None).into_response()),
    };
    let id = new_student.id;

    match state.insert(new_student).await {
        Ok(()) => {}
        Err(e) if e.status_code().is_client_error() => {
            return Ok(student_form(None, &form, &[], Some(e.public_message())).into_response());
        }
        Err(e) => return Err(e.into()),
    }
    info!(id, "Added student from form");

    Ok(changed(
        &state,
        student_form(None, &StudentForm::default(), &[], None),
    ))
}

pub async fn internal_put_student(
    State(state): State<RosterState>,
    Path(id): Path<String>,
    Form(form): Form<StudentForm>,
) -> HtmlResult<Response> {
    let id = parse_student_id(&id)?;
    let changes = match validate_changes(&StudentSubmission::from(&form)) {
        Ok(changes) => changes,
        Err(errors) => return Ok(student_form(Some(id), &form, &errors, None).into_response()),
    };

    match state.update(id, changes).await {
        Ok(()) => {}
        Err(e) if e.status_code().is_client_error() => {
            return Ok(
                student_form(Some(id), &form, &[], Some(e.public_message())).into_response(),
            );
        }
        Err(e) => return Err(e.into()),
    }
    info!(id, "Updated student from form");

    Ok(changed(
        &state,
        student_form(None, &StudentForm::default(), &[], None),
    ))
}

pub async fn internal_delete_student(
    State(state): State<RosterState>,
    Path(id): Path<String>,
) -> HtmlResult<Response> {
    let removed = async {
        let id = parse_student_id(&id)?;
        state.remove(id).await.map(|()| id)
    }
    .await;

    let id = match removed {
        Ok(id) => id,
        Err(e) if e.status_code().is_client_error() => {
            return Ok(error_alert(e.public_message()).into_response());
        }
        Err(e) => return Err(e.into()),
    };
    info!(id, "Deleted student from table");

    Ok(changed(&state, html! {}))
}
