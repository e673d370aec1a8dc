use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use bigdecimal::{BigDecimal, FromPrimitive};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{
    modules::{
        auth::{
            middleware::Auth,
            policy::{self, Capability},
        },
        menu_item, review,
    },
    types::Context,
    utils::pagination::Pagination,
};

use super::repository;

#[derive(Deserialize, Validate)]
struct CreateRestaurantBody {
    #[validate(length(min = 1, max = 100))]
    name: String,
    description: Option<String>,
    #[validate(length(min = 1))]
    address: String,
    #[validate(length(min = 3, max = 20))]
    phone_number: String,
    #[validate(length(min = 1, max = 50))]
    cuisine: String,
    #[validate(length(min = 1, max = 10))]
    opening_time: String,
    #[validate(length(min = 1, max = 10))]
    closing_time: String,
    #[serde(
        default,
        deserialize_with = "serde_aux::field_attributes::deserialize_number_from_string"
    )]
    #[validate(range(min = 0.0))]
    delivery_fee: f64,
    #[serde(
        default,
        deserialize_with = "serde_aux::field_attributes::deserialize_number_from_string"
    )]
    #[validate(range(min = 0.0))]
    minimum_order: f64,
}

async fn create_restaurant(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    Json(body): Json<CreateRestaurantBody>,
) -> impl IntoResponse {
    if !policy::allows(&auth.user, Capability::ManageRestaurants) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "Only restaurant owners can create restaurants" })),
        );
    }

    if let Err(errors) = body.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Validation failed", "errors": errors })),
        );
    }

    match repository::create(
        &ctx.db_conn.pool,
        repository::CreateRestaurantPayload {
            name: body.name,
            description: body.description,
            address: body.address,
            phone_number: body.phone_number,
            cuisine: body.cuisine,
            opening_time: body.opening_time,
            closing_time: body.closing_time,
            delivery_fee: BigDecimal::from_f64(body.delivery_fee).unwrap_or_default(),
            minimum_order: BigDecimal::from_f64(body.minimum_order).unwrap_or_default(),
            owner_id: auth.user.id,
        },
    )
    .await
    {
        Ok(restaurant) => (StatusCode::CREATED, Json(json!(restaurant))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to create restaurant" })),
        ),
    }
}

async fn get_restaurants(
    State(ctx): State<Arc<Context>>,
    pagination: Pagination,
    Query(filters): Query<repository::FindManyFilters>,
) -> impl IntoResponse {
    match repository::find_many(&ctx.db_conn.pool, pagination, filters).await {
        Ok(paginated_restaurants) => (StatusCode::OK, Json(json!(paginated_restaurants))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch restaurants" })),
        ),
    }
}

async fn get_owned_restaurants(State(ctx): State<Arc<Context>>, auth: Auth) -> impl IntoResponse {
    match repository::find_many_by_owner_id(&ctx.db_conn.pool, auth.user.id).await {
        Ok(restaurants) => (StatusCode::OK, Json(json!(restaurants))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch restaurants" })),
        ),
    }
}

async fn get_restaurant_by_id(
    State(ctx): State<Arc<Context>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match repository::find_by_id(&ctx.db_conn.pool, id).await {
        Ok(Some(restaurant)) => (StatusCode::OK, Json(json!(restaurant))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Restaurant not found" })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch restaurant" })),
        ),
    }
}

#[derive(Deserialize, Validate)]
struct UpdateRestaurantBody {
    #[validate(length(min = 1, max = 100))]
    name: Option<String>,
    description: Option<String>,
    #[validate(length(min = 1))]
    address: Option<String>,
    #[validate(length(min = 3, max = 20))]
    phone_number: Option<String>,
    #[validate(length(min = 1, max = 50))]
    cuisine: Option<String>,
    opening_time: Option<String>,
    closing_time: Option<String>,
    #[validate(range(min = 0.0))]
    delivery_fee: Option<f64>,
    #[validate(range(min = 0.0))]
    minimum_order: Option<f64>,
    is_active: Option<bool>,
}

async fn update_restaurant_by_id(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    Path(id): Path<String>,
    Json(body): Json<UpdateRestaurantBody>,
) -> impl IntoResponse {
    if let Err(errors) = body.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Validation failed", "errors": errors })),
        );
    }

    let restaurant = match repository::find_by_id(&ctx.db_conn.pool, id.clone()).await {
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

    match repository::update_by_id(
        &ctx.db_conn.pool,
        id,
        repository::UpdateRestaurantPayload {
            name: body.name,
            description: body.description,
            address: body.address,
            phone_number: body.phone_number,
            cuisine: body.cuisine,
            opening_time: body.opening_time,
            closing_time: body.closing_time,
            delivery_fee: body.delivery_fee.and_then(BigDecimal::from_f64),
            minimum_order: body.minimum_order.and_then(BigDecimal::from_f64),
            is_active: body.is_active,
        },
    )
    .await
    {
        Ok(Some(restaurant)) => (StatusCode::OK, Json(json!(restaurant))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Restaurant not found" })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to update restaurant" })),
        ),
    }
}

async fn delete_restaurant_by_id(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let restaurant = match repository::find_by_id(&ctx.db_conn.pool, id.clone()).await {
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

    match repository::delete_by_id(&ctx.db_conn.pool, id).await {
        Ok(true) => (
            StatusCode::OK,
            Json(json!({ "message": "Restaurant deleted" })),
        ),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Restaurant not found" })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to delete restaurant" })),
        ),
    }
}

#[derive(Deserialize)]
struct MenuItemFilters {
    category: Option<String>,
    is_available: Option<bool>,
}

async fn get_restaurant_menu_items(
    State(ctx): State<Arc<Context>>,
    Path(id): Path<String>,
    Query(filters): Query<MenuItemFilters>,
) -> impl IntoResponse {
    match repository::find_by_id(&ctx.db_conn.pool, id.clone()).await {
        Ok(Some(_)) => (),
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

    match menu_item::repository::find_many_by_restaurant_id(
        &ctx.db_conn.pool,
        id,
        menu_item::repository::FindManyFilters {
            category: filters.category,
            is_available: filters.is_available,
        },
    )
    .await
    {
        Ok(menu_items) => (StatusCode::OK, Json(json!(menu_items))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch menu items" })),
        ),
    }
}

async fn get_restaurant_reviews(
    State(ctx): State<Arc<Context>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match repository::find_by_id(&ctx.db_conn.pool, id.clone()).await {
        Ok(Some(_)) => (),
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

    match review::repository::find_many_approved_by_restaurant_id(&ctx.db_conn.pool, id).await {
        Ok(reviews) => (StatusCode::OK, Json(json!(reviews))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch reviews" })),
        ),
    }
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/", get(get_restaurants).post(create_restaurant))
        .route("/owned", get(get_owned_restaurants))
        .route(
            "/:id",
            get(get_restaurant_by_id)
                .patch(update_restaurant_by_id)
                .delete(delete_restaurant_by_id),
        )
        .route("/:id/menu-items", get(get_restaurant_menu_items))
        .route("/:id/reviews", get(get_restaurant_reviews))
}
