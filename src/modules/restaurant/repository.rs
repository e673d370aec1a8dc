use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;
use sqlx::{PgExecutor, PgPool};
use ulid::Ulid;

use crate::utils::pagination::{Paginated, Pagination};

type Result<T> = std::result::Result<T, Error>;

/// `rating` and `total_reviews` are derived columns, refreshed by the review
/// module whenever the approved review set changes. Nothing else writes them.
#[derive(Serialize, Deserialize, Clone, Debug, sqlx::FromRow)]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub phone_number: String,
    pub cuisine: String,
    pub opening_time: String,
    pub closing_time: String,
    #[serde(with = "crate::utils::decimal")]
    pub delivery_fee: BigDecimal,
    #[serde(with = "crate::utils::decimal")]
    pub minimum_order: BigDecimal,
    pub is_active: bool,
    #[serde(with = "crate::utils::decimal::option")]
    pub rating: Option<BigDecimal>,
    pub total_reviews: i32,
    pub owner_id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

pub struct CreateRestaurantPayload {
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub phone_number: String,
    pub cuisine: String,
    pub opening_time: String,
    pub closing_time: String,
    pub delivery_fee: BigDecimal,
    pub minimum_order: BigDecimal,
    pub owner_id: String,
}

#[derive(Default)]
pub struct UpdateRestaurantPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub cuisine: Option<String>,
    pub opening_time: Option<String>,
    pub closing_time: Option<String>,
    pub delivery_fee: Option<BigDecimal>,
    pub minimum_order: Option<BigDecimal>,
    pub is_active: Option<bool>,
}

#[derive(Debug)]
pub enum Error {
    UnexpectedError,
}

pub async fn create<'e, E: PgExecutor<'e>>(
    e: E,
    payload: CreateRestaurantPayload,
) -> Result<Restaurant> {
    sqlx::query_as::<_, Restaurant>(
        "
        INSERT INTO restaurants (
            id,
            name,
            description,
            address,
            phone_number,
            cuisine,
            opening_time,
            closing_time,
            delivery_fee,
            minimum_order,
            owner_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
        ",
    )
    .bind(Ulid::new().to_string())
    .bind(payload.name)
    .bind(payload.description)
    .bind(payload.address)
    .bind(payload.phone_number)
    .bind(payload.cuisine)
    .bind(payload.opening_time)
    .bind(payload.closing_time)
    .bind(payload.delivery_fee)
    .bind(payload.minimum_order)
    .bind(payload.owner_id)
    .fetch_one(e)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while trying to create a restaurant: {}", err);
        Error::UnexpectedError
    })
}

pub async fn find_by_id<'e, E: PgExecutor<'e>>(e: E, id: String) -> Result<Option<Restaurant>> {
    sqlx::query_as::<_, Restaurant>("SELECT * FROM restaurants WHERE id = $1")
        .bind(id)
        .fetch_optional(e)
        .await
        .map_err(|err| {
            tracing::error!("Error occurred while trying to fetch restaurant by id: {}", err);
            Error::UnexpectedError
        })
}

#[derive(Deserialize, Clone)]
pub struct FindManyFilters {
    pub cuisine: Option<String>,
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

pub async fn find_many(
    pool: &PgPool,
    pagination: Pagination,
    filters: FindManyFilters,
) -> Result<Paginated<Restaurant>> {
    let restaurants = sqlx::query_as::<_, Restaurant>(
        "
        SELECT * FROM restaurants
        WHERE
            ($1::TEXT IS NULL OR cuisine = $1)
            AND ($2::TEXT IS NULL OR name ILIKE CONCAT('%', $2, '%'))
            AND ($3::BOOLEAN IS NULL OR is_active = $3)
        ORDER BY created_at DESC
        LIMIT $4 OFFSET $5
        ",
    )
    .bind(filters.cuisine.clone())
    .bind(filters.search.clone())
    .bind(filters.is_active)
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(pool)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while trying to fetch many restaurants: {}", err);
        Error::UnexpectedError
    })?;

    let total = sqlx::query_scalar::<_, i64>(
        "
        SELECT COUNT(id) FROM restaurants
        WHERE
            ($1::TEXT IS NULL OR cuisine = $1)
            AND ($2::TEXT IS NULL OR name ILIKE CONCAT('%', $2, '%'))
            AND ($3::BOOLEAN IS NULL OR is_active = $3)
        ",
    )
    .bind(filters.cuisine)
    .bind(filters.search)
    .bind(filters.is_active)
    .fetch_one(pool)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while trying to count restaurants: {}", err);
        Error::UnexpectedError
    })?;

    Ok(Paginated::new(
        restaurants,
        total as u32,
        pagination.page,
        pagination.per_page,
    ))
}

pub async fn find_many_by_owner_id<'e, E: PgExecutor<'e>>(
    e: E,
    owner_id: String,
) -> Result<Vec<Restaurant>> {
    sqlx::query_as::<_, Restaurant>(
        "SELECT * FROM restaurants WHERE owner_id = $1 ORDER BY created_at DESC",
    )
    .bind(owner_id)
    .fetch_all(e)
    .await
    .map_err(|err| {
        tracing::error!(
            "Error occurred while trying to fetch restaurants by owner: {}",
            err
        );
        Error::UnexpectedError
    })
}

pub async fn update_by_id<'e, E: PgExecutor<'e>>(
    e: E,
    id: String,
    payload: UpdateRestaurantPayload,
) -> Result<Option<Restaurant>> {
    sqlx::query_as::<_, Restaurant>(
        "
        UPDATE restaurants SET
            name = COALESCE($1, name),
            description = COALESCE($2, description),
            address = COALESCE($3, address),
            phone_number = COALESCE($4, phone_number),
            cuisine = COALESCE($5, cuisine),
            opening_time = COALESCE($6, opening_time),
            closing_time = COALESCE($7, closing_time),
            delivery_fee = COALESCE($8, delivery_fee),
            minimum_order = COALESCE($9, minimum_order),
            is_active = COALESCE($10, is_active),
            updated_at = NOW()
        WHERE id = $11
        RETURNING *
        ",
    )
    .bind(payload.name)
    .bind(payload.description)
    .bind(payload.address)
    .bind(payload.phone_number)
    .bind(payload.cuisine)
    .bind(payload.opening_time)
    .bind(payload.closing_time)
    .bind(payload.delivery_fee)
    .bind(payload.minimum_order)
    .bind(payload.is_active)
    .bind(id)
    .fetch_optional(e)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while trying to update restaurant: {}", err);
        Error::UnexpectedError
    })
}

pub async fn delete_by_id<'e, E: PgExecutor<'e>>(e: E, id: String) -> Result<bool> {
    sqlx::query("DELETE FROM restaurants WHERE id = $1")
        .bind(id)
        .execute(e)
        .await
        .map(|result| result.rows_affected() > 0)
        .map_err(|err| {
            tracing::error!("Error occurred while trying to delete restaurant: {}", err);
            Error::UnexpectedError
        })
}
