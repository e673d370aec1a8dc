use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use ulid::Ulid;

type Result<T> = std::result::Result<T, Error>;

#[derive(Serialize, Deserialize, Clone, Debug, sqlx::FromRow)]
pub struct Review {
    pub id: String,
    pub rating: i32,
    pub comment: Option<String>,
    // Reviews start unmoderated and only count towards a restaurant's cached
    // rating once approved.
    pub is_approved: bool,
    pub restaurant_id: String,
    pub user_id: String,
    pub order_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

pub struct CreateReviewPayload {
    pub rating: i32,
    pub comment: Option<String>,
    pub restaurant_id: String,
    pub user_id: String,
    pub order_id: Option<String>,
}

#[derive(Debug)]
pub enum Error {
    UnexpectedError,
}

pub async fn create<'e, E: PgExecutor<'e>>(e: E, payload: CreateReviewPayload) -> Result<Review> {
    sqlx::query_as::<_, Review>(
        "
        INSERT INTO reviews (id, rating, comment, restaurant_id, user_id, order_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        ",
    )
    .bind(Ulid::new().to_string())
    .bind(payload.rating)
    .bind(payload.comment)
    .bind(payload.restaurant_id)
    .bind(payload.user_id)
    .bind(payload.order_id)
    .fetch_one(e)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while trying to create a review: {}", err);
        Error::UnexpectedError
    })
}

pub async fn find_by_id<'e, E: PgExecutor<'e>>(e: E, id: String) -> Result<Option<Review>> {
    sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = $1")
        .bind(id)
        .fetch_optional(e)
        .await
        .map_err(|err| {
            tracing::error!("Error occurred while trying to fetch review by id: {}", err);
            Error::UnexpectedError
        })
}

pub async fn find_many_approved_by_restaurant_id<'e, E: PgExecutor<'e>>(
    e: E,
    restaurant_id: String,
) -> Result<Vec<Review>> {
    sqlx::query_as::<_, Review>(
        "
        SELECT * FROM reviews
        WHERE restaurant_id = $1 AND is_approved = TRUE
        ORDER BY created_at DESC
        ",
    )
    .bind(restaurant_id)
    .fetch_all(e)
    .await
    .map_err(|err| {
        tracing::error!(
            "Error occurred while trying to fetch reviews by restaurant: {}",
            err
        );
        Error::UnexpectedError
    })
}

pub async fn find_many_pending<'e, E: PgExecutor<'e>>(e: E) -> Result<Vec<Review>> {
    sqlx::query_as::<_, Review>(
        "SELECT * FROM reviews WHERE is_approved = FALSE ORDER BY created_at",
    )
    .fetch_all(e)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while trying to fetch pending reviews: {}", err);
        Error::UnexpectedError
    })
}

pub async fn find_many_by_user_id<'e, E: PgExecutor<'e>>(
    e: E,
    user_id: String,
) -> Result<Vec<Review>> {
    sqlx::query_as::<_, Review>(
        "SELECT * FROM reviews WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(e)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while trying to fetch reviews by user: {}", err);
        Error::UnexpectedError
    })
}

pub async fn set_approval<'e, E: PgExecutor<'e>>(
    e: E,
    id: String,
    is_approved: bool,
) -> Result<Option<Review>> {
    sqlx::query_as::<_, Review>(
        "
        UPDATE reviews SET
            is_approved = $1,
            updated_at = NOW()
        WHERE id = $2
        RETURNING *
        ",
    )
    .bind(is_approved)
    .bind(id)
    .fetch_optional(e)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while trying to moderate review: {}", err);
        Error::UnexpectedError
    })
}

pub async fn delete_by_id<'e, E: PgExecutor<'e>>(e: E, id: String) -> Result<bool> {
    sqlx::query("DELETE FROM reviews WHERE id = $1")
        .bind(id)
        .execute(e)
        .await
        .map(|result| result.rows_affected() > 0)
        .map_err(|err| {
            tracing::error!("Error occurred while trying to delete review: {}", err);
            Error::UnexpectedError
        })
}

/// Refreshes the restaurant's cached `(rating, total_reviews)` pair from its
/// approved reviews. With no approved reviews the rating becomes NULL, not 0.
pub async fn recompute_restaurant_rating<'e, E: PgExecutor<'e>>(
    e: E,
    restaurant_id: String,
) -> Result<()> {
    sqlx::query(
        "
        UPDATE restaurants SET
            rating = agg.average_rating,
            total_reviews = agg.approved_count,
            updated_at = NOW()
        FROM (
            SELECT
                AVG(rating)::NUMERIC(3, 2) AS average_rating,
                COUNT(id)::INT AS approved_count
            FROM reviews
            WHERE restaurant_id = $1 AND is_approved = TRUE
        ) AS agg
        WHERE restaurants.id = $1
        ",
    )
    .bind(restaurant_id.clone())
    .execute(e)
    .await
    .map(|_| ())
    .map_err(|err| {
        tracing::error!(
            "Error occurred while trying to recompute rating for restaurant {}: {}",
            restaurant_id,
            err
        );
        Error::UnexpectedError
    })
}
