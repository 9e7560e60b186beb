use crate::state::RosterState;
use axum::extract::State;
use maud::{Markup, html};

pub async fn get_index_route(State(state): State<RosterState>) -> Markup {
    state.render(html! {
        div sse-connect="/sse_feed" class="mx-auto max-w-4xl w-full flex flex-col space-y-4 px-4 pb-8" {
            div id="student_form" class="bg-gray-800 rounded shadow-md" hx-get="/internal/students/form" hx-trigger="load" {}
            div id="student_table" hx-get="/internal/students" hx-trigger="load" hx-swap="outerHTML" {
                p class="text-center italic" {"Loading..."}
            }
        }
    })
}
