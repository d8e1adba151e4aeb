/*
 * Responsibility
 * - /drinks CRUD handlers
 * - Permission checks happen in the route guard; handlers only see AuthCtx
 * - Body / path problems are answered in the common JSON error shape
 */
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};

use crate::{
    api::{
        dto::drinks::{
            CreateDrinkRequest, DeleteDrinkResponse, DrinkLong, DrinkShort, DrinksResponse,
            UpdateDrinkRequest,
        },
        extractors::AuthCtxExtractor,
    },
    error::AppError,
    repos::drink_repo,
    state::AppState,
};

fn drink_id(path: Result<Path<i32>, PathRejection>) -> Result<i32, AppError> {
    path.map(|Path(id)| id)
        .map_err(|_| AppError::not_found("drink"))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected request body");
        AppError::unprocessable("Missing values.")
    })
}

pub async fn list_drinks(
    State(state): State<AppState>,
) -> Result<Json<DrinksResponse<Vec<DrinkShort>>>, AppError> {
    let drinks = drink_repo::list(&state.db).await?;
    if drinks.is_empty() {
        return Err(AppError::not_found("drinks"));
    }

    Ok(Json(DrinksResponse::ok(
        drinks.into_iter().map(DrinkShort::from).collect(),
    )))
}

pub async fn list_drinks_detail(
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    State(state): State<AppState>,
) -> Result<Json<DrinksResponse<Vec<DrinkLong>>>, AppError> {
    tracing::debug!(
        subject = ctx.subject().unwrap_or("-"),
        permissions = ?ctx.permissions(),
        "listing drink details"
    );

    let drinks = drink_repo::list(&state.db).await?;
    if drinks.is_empty() {
        return Err(AppError::not_found("drinks"));
    }

    Ok(Json(DrinksResponse::ok(
        drinks.into_iter().map(DrinkLong::from).collect(),
    )))
}

pub async fn create_drink(
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    State(state): State<AppState>,
    payload: Result<Json<CreateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksResponse<DrinkLong>>, AppError> {
    let (title, recipe) = body(payload)?
        .validate()
        .map_err(AppError::unprocessable)?;

    let drink = drink_repo::create(&state.db, &title, &recipe).await?;

    tracing::info!(
        drink_id = drink.id,
        subject = ctx.subject().unwrap_or("-"),
        "drink created"
    );

    Ok(Json(DrinksResponse::ok(DrinkLong::from(drink))))
}

pub async fn update_drink(
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksResponse<DrinkLong>>, AppError> {
    let id = drink_id(path)?;
    let (title, recipe) = body(payload)?
        .into_changes()
        .map_err(AppError::unprocessable)?;

    let drink = drink_repo::update(&state.db, id, title.as_deref(), recipe.as_deref())
        .await?
        .ok_or(AppError::not_found("drink"))?;

    tracing::info!(
        drink_id = id,
        subject = ctx.subject().unwrap_or("-"),
        "drink updated"
    );

    Ok(Json(DrinksResponse::ok(DrinkLong::from(drink))))
}

pub async fn delete_drink(
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<DeleteDrinkResponse>, AppError> {
    let id = drink_id(path)?;

    if !drink_repo::delete(&state.db, id).await? {
        return Err(AppError::not_found("drink"));
    }

    tracing::info!(
        drink_id = id,
        subject = ctx.subject().unwrap_or("-"),
        "drink deleted"
    );

    Ok(Json(DeleteDrinkResponse {
        success: true,
        delete: id,
    }))
}
