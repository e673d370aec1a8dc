use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::patch,
    Json, Router,
};
use bigdecimal::{BigDecimal, FromPrimitive};
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::{
    modules::{
        auth::{
            middleware::Auth,
            policy::{self, Capability},
        },
        menu_item, restaurant,
    },
    types::Context,
};

use super::repository::{self, MenuItemOption};

type Rejection = (StatusCode, Json<Value>);

/// Walks option -> menu item -> restaurant to check ownership.
async fn authorize_mutation(
    ctx: &Arc<Context>,
    auth: &Auth,
    option_id: String,
) -> Result<MenuItemOption, Rejection> {
    let option = repository::find_by_id(&ctx.db_conn.pool, option_id)
        .await
        .map_err(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch menu item option" })),
            )
        })?
        .ok_or((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Menu item option not found" })),
        ))?;

    let menu_item =
        menu_item::repository::find_by_id(&ctx.db_conn.pool, option.menu_item_id.clone())
            .await
            .map_err(|_| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to fetch menu item" })),
                )
            })?
            .ok_or((
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Menu item not found" })),
            ))?;

    let restaurant =
        restaurant::repository::find_by_id(&ctx.db_conn.pool, menu_item.restaurant_id.clone())
            .await
            .map_err(|_| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to fetch restaurant" })),
                )
            })?
            .ok_or((
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Restaurant not found" })),
            ))?;

    if !policy::allows(
        &auth.user,
        Capability::MutateRestaurant {
            owner_id: restaurant.owner_id.as_str(),
        },
    ) {
        return Err((
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "User does not own this restaurant" })),
        ));
    }

    Ok(option)
}

#[derive(Deserialize, Validate)]
struct UpdateOptionBody {
    #[validate(length(min = 1, max = 100))]
    name: Option<String>,
    price_modifier: Option<f64>,
    is_required: Option<bool>,
    sort_order: Option<i32>,
}

async fn update_option_by_id(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    Path(id): Path<String>,
    Json(body): Json<UpdateOptionBody>,
) -> impl IntoResponse {
    if let Err(errors) = body.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Validation failed", "errors": errors })),
        );
    }

    if let Err(rejection) = authorize_mutation(&ctx, &auth, id.clone()).await {
        return rejection;
    }

    match repository::update_by_id(
        &ctx.db_conn.pool,
        id,
        repository::UpdateMenuItemOptionPayload {
            name: body.name,
            price_modifier: body.price_modifier.and_then(BigDecimal::from_f64),
            is_required: body.is_required,
            sort_order: body.sort_order,
        },
    )
    .await
    {
        Ok(Some(option)) => (StatusCode::OK, Json(json!(option))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Menu item option not found" })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to update menu item option" })),
        ),
    }
}

async fn delete_option_by_id(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if let Err(rejection) = authorize_mutation(&ctx, &auth, id.clone()).await {
        return rejection;
    }

    match repository::delete_by_id(&ctx.db_conn.pool, id).await {
        Ok(true) => (
            StatusCode::OK,
            Json(json!({ "message": "Menu item option deleted" })),
        ),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Menu item option not found" })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to delete menu item option" })),
        ),
    }
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new().route("/:id", patch(update_option_by_id).delete(delete_option_by_id))
}
