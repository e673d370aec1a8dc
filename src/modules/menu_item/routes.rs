use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
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
        menu_item_option, restaurant,
    },
    types::Context,
};

use super::repository::{self, MenuItem};

type Rejection = (StatusCode, Json<Value>);

/// Loads the item and checks the caller owns the restaurant it belongs to.
async fn authorize_mutation(
    ctx: &Arc<Context>,
    auth: &Auth,
    menu_item_id: String,
) -> Result<MenuItem, Rejection> {
    let menu_item = repository::find_by_id(&ctx.db_conn.pool, menu_item_id)
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

    Ok(menu_item)
}

#[derive(Deserialize, Validate)]
struct CreateMenuItemBody {
    #[validate(length(min = 1, max = 100))]
    name: String,
    description: Option<String>,
    #[serde(deserialize_with = "serde_aux::field_attributes::deserialize_number_from_string")]
    #[validate(range(min = 0.0))]
    price: f64,
    #[validate(length(min = 1, max = 50))]
    category: String,
    image_url: Option<String>,
    restaurant_id: String,
}

async fn create_menu_item(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    Json(body): Json<CreateMenuItemBody>,
) -> impl IntoResponse {
    if let Err(errors) = body.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Validation failed", "errors": errors })),
        );
    }

    let restaurant =
        match restaurant::repository::find_by_id(&ctx.db_conn.pool, body.restaurant_id.clone())
            .await
        {
            Ok(Some(restaurant)) => restaurant,
            Ok(None) => {
                return (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "error": "Restaurant not found" })),
                )
            }
            Err(_) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to fetch restaurant" })),
                )
            }
        };

    if !policy::allows(
        &auth.user,
        Capability::MutateRestaurant {
            owner_id: restaurant.owner_id.as_str(),
        },
    ) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "User does not own this restaurant" })),
        );
    }

    match repository::create(
        &ctx.db_conn.pool,
        repository::CreateMenuItemPayload {
            name: body.name,
            description: body.description,
            price: BigDecimal::from_f64(body.price).unwrap_or_default(),
            category: body.category,
            image_url: body.image_url,
            restaurant_id: body.restaurant_id,
        },
    )
    .await
    {
        Ok(menu_item) => (StatusCode::CREATED, Json(json!(menu_item))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to create menu item" })),
        ),
    }
}

async fn get_menu_item_by_id(
    State(ctx): State<Arc<Context>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match repository::find_by_id(&ctx.db_conn.pool, id).await {
        Ok(Some(menu_item)) => (StatusCode::OK, Json(json!(menu_item))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Menu item not found" })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch menu item" })),
        ),
    }
}

#[derive(Deserialize, Validate)]
struct UpdateMenuItemBody {
    #[validate(length(min = 1, max = 100))]
    name: Option<String>,
    description: Option<String>,
    #[validate(range(min = 0.0))]
    price: Option<f64>,
    #[validate(length(min = 1, max = 50))]
    category: Option<String>,
    image_url: Option<String>,
}

async fn update_menu_item_by_id(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    Path(id): Path<String>,
    Json(body): Json<UpdateMenuItemBody>,
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
        repository::UpdateMenuItemPayload {
            name: body.name,
            description: body.description,
            price: body.price.and_then(BigDecimal::from_f64),
            category: body.category,
            image_url: body.image_url,
        },
    )
    .await
    {
        Ok(Some(menu_item)) => (StatusCode::OK, Json(json!(menu_item))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Menu item not found" })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to update menu item" })),
        ),
    }
}

#[derive(Deserialize)]
struct UpdateAvailabilityBody {
    is_available: bool,
}

async fn update_menu_item_availability(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    Path(id): Path<String>,
    Json(body): Json<UpdateAvailabilityBody>,
) -> impl IntoResponse {
    if let Err(rejection) = authorize_mutation(&ctx, &auth, id.clone()).await {
        return rejection;
    }

    match repository::update_availability_by_id(&ctx.db_conn.pool, id, body.is_available).await {
        Ok(Some(menu_item)) => (StatusCode::OK, Json(json!(menu_item))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Menu item not found" })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to update menu item availability" })),
        ),
    }
}

async fn delete_menu_item_by_id(
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
            Json(json!({ "message": "Menu item deleted" })),
        ),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Menu item not found" })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to delete menu item" })),
        ),
    }
}

#[derive(Deserialize, Validate)]
struct CreateOptionBody {
    #[validate(length(min = 1, max = 100))]
    name: String,
    #[serde(
        default,
        deserialize_with = "serde_aux::field_attributes::deserialize_number_from_string"
    )]
    price_modifier: f64,
    #[serde(default)]
    is_required: bool,
    #[serde(default)]
    sort_order: i32,
}

async fn create_menu_item_option(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    Path(id): Path<String>,
    Json(body): Json<CreateOptionBody>,
) -> impl IntoResponse {
    if let Err(errors) = body.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Validation failed", "errors": errors })),
        );
    }

    let menu_item = match authorize_mutation(&ctx, &auth, id).await {
        Ok(menu_item) => menu_item,
        Err(rejection) => return rejection,
    };

    match menu_item_option::repository::create(
        &ctx.db_conn.pool,
        menu_item_option::repository::CreateMenuItemOptionPayload {
            name: body.name,
            price_modifier: BigDecimal::from_f64(body.price_modifier).unwrap_or_default(),
            is_required: body.is_required,
            sort_order: body.sort_order,
            menu_item_id: menu_item.id,
        },
    )
    .await
    {
        Ok(option) => (StatusCode::CREATED, Json(json!(option))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to create menu item option" })),
        ),
    }
}

async fn get_menu_item_options(
    State(ctx): State<Arc<Context>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match repository::find_by_id(&ctx.db_conn.pool, id.clone()).await {
        Ok(Some(_)) => (),
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Menu item not found" })),
            )
        }
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch menu item" })),
            )
        }
    };

    match menu_item_option::repository::find_many_by_menu_item_id(&ctx.db_conn.pool, id).await {
        Ok(options) => (StatusCode::OK, Json(json!(options))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch menu item options" })),
        ),
    }
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/", axum::routing::post(create_menu_item))
        .route(
            "/:id",
            get(get_menu_item_by_id)
                .patch(update_menu_item_by_id)
                .delete(delete_menu_item_by_id),
        )
        .route("/:id/availability", patch(update_menu_item_availability))
        .route(
            "/:id/options",
            get(get_menu_item_options).post(create_menu_item_option),
        )
}
