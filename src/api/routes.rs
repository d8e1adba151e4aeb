/*
 * Responsibility
 * - URL structure of the service
 * - Which route needs which permission is decided here, at registration time
 */
use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::api::handlers::{
    drinks::{create_drink, delete_drink, list_drinks, list_drinks_detail, update_drink},
    health::health,
};
use crate::middleware::auth::permission::require;
use crate::services::auth::Permission;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let auth = &state.auth;

    Router::new()
        .route("/health", get(health))
        .route(
            "/drinks",
            get(list_drinks).merge(require(
                post(create_drink),
                Permission::POST_DRINKS,
                auth.clone(),
            )),
        )
        .route(
            "/drinks-detail",
            require(
                get(list_drinks_detail),
                Permission::GET_DRINKS_DETAIL,
                auth.clone(),
            ),
        )
        .route(
            "/drinks/{drink_id}",
            require(patch(update_drink), Permission::PATCH_DRINKS, auth.clone()).merge(require(
                delete(delete_drink),
                Permission::DELETE_DRINKS,
                auth.clone(),
            )),
        )
}
