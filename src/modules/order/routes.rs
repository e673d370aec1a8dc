use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use chrono::{NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    modules::{
        auth::{
            middleware::Auth,
            policy::{self, Capability},
        },
        restaurant,
        user,
    },
    types::Context,
    utils::pagination::Pagination,
};

use super::{
    repository::{self, Order, OrderStatus},
    tracking,
};

type Rejection = (StatusCode, Json<Value>);

#[derive(Deserialize)]
struct Filters {
    status: Option<OrderStatus>,
    restaurant_id: Option<String>,
}

async fn get_orders(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    pagination: Pagination,
    Query(filters): Query<Filters>,
) -> impl IntoResponse {
    let filters = match user::repository::is_admin(&auth.user) {
        true => repository::Filters {
            user_id: None,
            restaurant_id: filters.restaurant_id,
            status: filters.status,
        },
        false => match filters.restaurant_id {
            // A restaurant owner asking for one of their restaurants sees
            // every order placed against it.
            Some(restaurant_id) => {
                let restaurant = match restaurant::repository::find_by_id(
                    &ctx.db_conn.pool,
                    restaurant_id.clone(),
                )
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

                if restaurant.owner_id != auth.user.id {
                    return (
                        StatusCode::FORBIDDEN,
                        Json(json!({ "error": "User does not own this restaurant" })),
                    );
                }

                repository::Filters {
                    user_id: None,
                    restaurant_id: Some(restaurant_id),
                    status: filters.status,
                }
            }
            None => repository::Filters {
                user_id: Some(auth.user.id.clone()),
                restaurant_id: None,
                status: filters.status,
            },
        },
    };

    match repository::find_many(&ctx.db_conn.pool, pagination, filters).await {
        Ok(paginated_orders) => (StatusCode::OK, Json(json!(paginated_orders))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch orders" })),
        ),
    }
}

/// Loads the order and rejects callers that are neither the customer, the
/// restaurant owner, nor an admin.
async fn authorize_view(
    ctx: &Arc<Context>,
    auth: &Auth,
    order_id: String,
) -> Result<Order, Rejection> {
    let order = repository::find_by_id(&ctx.db_conn.pool, order_id)
        .await
        .map_err(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch order" })),
            )
        })?
        .ok_or((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Order not found" })),
        ))?;

    let restaurant = restaurant::repository::find_by_id(&ctx.db_conn.pool, order.restaurant_id.clone())
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
        Capability::ViewOrder {
            customer_id: order.user_id.as_str(),
            restaurant_owner_id: restaurant.owner_id.as_str(),
        },
    ) {
        return Err((
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "User cannot access this order" })),
        ));
    }

    Ok(order)
}

async fn get_order_by_id(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match authorize_view(&ctx, &auth, id).await {
        Ok(order) => (StatusCode::OK, Json(json!(order))),
        Err(rejection) => rejection,
    }
}

async fn get_order_tracking(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let order = match authorize_view(&ctx, &auth, id).await {
        Ok(order) => order,
        Err(rejection) => return rejection,
    };

    let now = Utc::now().naive_utc();

    (
        StatusCode::OK,
        Json(json!({
            "order_id": order.id,
            "status": order.status,
            "step": tracking::step(order.status),
            "total_steps": tracking::STATUS_SEQUENCE.len(),
            "progress_percent": tracking::progress_percent(order.status),
            "estimated_delivery": tracking::eta_text(
                order.status,
                order.estimated_delivery_time,
                now,
            ),
        })),
    )
}

#[derive(Deserialize)]
struct UpdateStatusBody {
    status: OrderStatus,
    estimated_delivery_time: Option<NaiveDateTime>,
    as_restaurant: Option<bool>,
}

async fn update_order_status(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusBody>,
) -> impl IntoResponse {
    let order = match repository::find_by_id(&ctx.db_conn.pool, id.clone()).await {
        Ok(Some(order)) => order,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Order not found" })),
            )
        }
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch order" })),
            )
        }
    };

    let as_restaurant = body.as_restaurant.unwrap_or(false);

    if as_restaurant {
        let restaurant = match restaurant::repository::find_by_id(
            &ctx.db_conn.pool,
            order.restaurant_id.clone(),
        )
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
            Capability::AdvanceOrder {
                restaurant_owner_id: restaurant.owner_id.as_str(),
            },
        ) {
            return (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": "User does not own this restaurant" })),
            );
        }
    } else {
        if !policy::allows(
            &auth.user,
            Capability::CancelOrder {
                customer_id: order.user_id.as_str(),
            },
        ) {
            return (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": "User does not own this order" })),
            );
        }

        // Customers cannot advance the progression, only abandon it.
        if body.status != OrderStatus::Cancelled {
            return (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": "Customers may only cancel an order" })),
            );
        }
    }

    if !order.status.can_transition(body.status) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": format!(
                    "Cannot move order from {} to {}",
                    order.status, body.status
                )
            })),
        );
    }

    match repository::update_status(
        &ctx.db_conn.pool,
        id,
        order.status,
        body.status,
        body.estimated_delivery_time,
    )
    .await
    {
        Ok(Some(order)) => (StatusCode::OK, Json(json!(order))),
        Ok(None) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Order status has changed, retry the transition" })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to update order status" })),
        ),
    }
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/", get(get_orders))
        .route("/:id", get(get_order_by_id))
        .route("/:id/status", patch(update_order_status))
        .route("/:id/tracking", get(get_order_tracking))
}
