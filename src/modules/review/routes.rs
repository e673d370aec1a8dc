use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{
    modules::{
        auth::{
            middleware::Auth,
            policy::{self, Capability},
        },
        restaurant,
    },
    types::Context,
};

use super::repository;

#[derive(Deserialize, Validate)]
struct CreateReviewBody {
    #[validate(range(min = 1, max = 5))]
    rating: i32,
    #[validate(length(max = 2000))]
    comment: Option<String>,
    restaurant_id: String,
    order_id: Option<String>,
}

async fn create_review(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    Json(body): Json<CreateReviewBody>,
) -> impl IntoResponse {
    if let Err(errors) = body.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Validation failed", "errors": errors })),
        );
    }

    // Creation never touches the cached rating: a new review is unapproved
    // and therefore not part of the aggregate yet.
    match restaurant::repository::find_by_id(&ctx.db_conn.pool, body.restaurant_id.clone()).await {
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

    match repository::create(
        &ctx.db_conn.pool,
        repository::CreateReviewPayload {
            rating: body.rating,
            comment: body.comment,
            restaurant_id: body.restaurant_id,
            user_id: auth.user.id,
            order_id: body.order_id,
        },
    )
    .await
    {
        Ok(review) => (StatusCode::CREATED, Json(json!(review))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to create review" })),
        ),
    }
}

async fn get_pending_reviews(State(ctx): State<Arc<Context>>, auth: Auth) -> impl IntoResponse {
    if !policy::allows(&auth.user, Capability::ModerateReviews) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "Only admins can list pending reviews" })),
        );
    }

    match repository::find_many_pending(&ctx.db_conn.pool).await {
        Ok(reviews) => (StatusCode::OK, Json(json!(reviews))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch pending reviews" })),
        ),
    }
}

#[derive(Deserialize)]
struct ModerateReviewBody {
    is_approved: bool,
}

async fn moderate_review(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    Path(id): Path<String>,
    Json(body): Json<ModerateReviewBody>,
) -> impl IntoResponse {
    if !policy::allows(&auth.user, Capability::ModerateReviews) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "Only admins can moderate reviews" })),
        );
    }

    // The review write and the aggregate refresh commit together, so the
    // cached rating can never observe only half of this moderation.
    let mut tx = match ctx.db_conn.pool.begin().await {
        Ok(tx) => tx,
        Err(err) => {
            tracing::error!("Failed to start database transaction: {}", err);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to moderate review" })),
            );
        }
    };

    let review = match repository::find_by_id(&mut *tx, id.clone()).await {
        Ok(Some(review)) => review,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Review not found" })),
            )
        }
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to moderate review" })),
            )
        }
    };

    let moderated = match repository::set_approval(&mut *tx, id, body.is_approved).await {
        Ok(Some(review)) => review,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Review not found" })),
            )
        }
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to moderate review" })),
            )
        }
    };

    // The aggregate only moves when the approved set changes: approving (or
    // re-approving, which recomputes to the same values) and un-approving a
    // previously approved review. Rejecting a pending review never counted.
    if body.is_approved || review.is_approved {
        if repository::recompute_restaurant_rating(&mut *tx, review.restaurant_id.clone())
            .await
            .is_err()
        {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to moderate review" })),
            );
        }
    }

    match tx.commit().await {
        Ok(_) => (StatusCode::OK, Json(json!(moderated))),
        Err(err) => {
            tracing::error!("Failed to commit database transaction: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to moderate review" })),
            )
        }
    }
}

async fn delete_review(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let mut tx = match ctx.db_conn.pool.begin().await {
        Ok(tx) => tx,
        Err(err) => {
            tracing::error!("Failed to start database transaction: {}", err);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to delete review" })),
            );
        }
    };

    let review = match repository::find_by_id(&mut *tx, id.clone()).await {
        Ok(Some(review)) => review,
        // Deleting an already-deleted review is a NotFound, not a silent
        // success.
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Review not found" })),
            )
        }
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to delete review" })),
            )
        }
    };

    if !policy::allows(
        &auth.user,
        Capability::MutateReview {
            author_id: review.user_id.as_str(),
        },
    ) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "User does not own this review" })),
        );
    }

    match repository::delete_by_id(&mut *tx, id).await {
        Ok(true) => (),
        Ok(false) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Review not found" })),
            )
        }
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to delete review" })),
            )
        }
    };

    // A pending review never contributed to the aggregate, so only the
    // deletion of an approved one triggers the refresh.
    if review.is_approved {
        if repository::recompute_restaurant_rating(&mut *tx, review.restaurant_id.clone())
            .await
            .is_err()
        {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to delete review" })),
            );
        }
    }

    match tx.commit().await {
        Ok(_) => (StatusCode::OK, Json(json!({ "message": "Review deleted" }))),
        Err(err) => {
            tracing::error!("Failed to commit database transaction: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to delete review" })),
            )
        }
    }
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/", post(create_review))
        .route("/pending", get(get_pending_reviews))
        .route("/:id", axum::routing::delete(delete_review))
        .route("/:id/moderation", patch(moderate_review))
}
