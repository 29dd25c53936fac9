//! State and fun-fact routes under /states.

use crate::handlers::{
    add_funfacts, delete_funfact, list_states, random_funfact, read_state, state_admission, state_capital,
    state_nickname, state_population, update_funfact,
};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn state_routes(state: AppState) -> Router {
    Router::new()
        .route("/states", get(list_states))
        .route("/states/:state", get(read_state))
        .route(
            "/states/:state/funfact",
            get(random_funfact)
                .post(add_funfacts)
                .patch(update_funfact)
                .delete(delete_funfact),
        )
        .route("/states/:state/capital", get(state_capital))
        .route("/states/:state/nickname", get(state_nickname))
        .route("/states/:state/population", get(state_population))
        .route("/states/:state/admission", get(state_admission))
        .with_state(state)
}
