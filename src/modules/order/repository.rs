use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;
use sqlx::{PgExecutor, PgPool};
use std::fmt;

use crate::utils::pagination::{Paginated, Pagination};

type Result<T> = std::result::Result<T, Error>;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Created,
    Confirmed,
    Preparing,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// The linear progression steps exactly one position forward; cancelling
    /// is allowed from any status that has not yet left the kitchen.
    pub fn can_transition(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (Self::Created, Self::Confirmed)
                | (Self::Confirmed, Self::Preparing)
                | (Self::Preparing, Self::OutForDelivery)
                | (Self::OutForDelivery, Self::Delivered)
                | (
                    Self::Created | Self::Confirmed | Self::Preparing,
                    Self::Cancelled
                )
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{}", value)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "payment_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

#[derive(Serialize, Deserialize, Clone, Debug, sqlx::FromRow)]
pub struct Order {
    pub id: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    #[serde(with = "crate::utils::decimal")]
    pub sub_total: BigDecimal,
    #[serde(with = "crate::utils::decimal")]
    pub delivery_fee: BigDecimal,
    #[serde(with = "crate::utils::decimal")]
    pub tax: BigDecimal,
    #[serde(with = "crate::utils::decimal")]
    pub total: BigDecimal,
    pub delivery_address: String,
    pub notes: Option<String>,
    pub estimated_delivery_time: Option<NaiveDateTime>,
    pub restaurant_id: String,
    pub user_id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug)]
pub enum Error {
    UnexpectedError,
}

pub async fn find_by_id<'e, E: PgExecutor<'e>>(e: E, id: String) -> Result<Option<Order>> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(e)
        .await
        .map_err(|err| {
            tracing::error!("Error occurred while trying to fetch order by id: {}", err);
            Error::UnexpectedError
        })
}

#[derive(Clone, Deserialize)]
pub struct Filters {
    pub user_id: Option<String>,
    pub restaurant_id: Option<String>,
    pub status: Option<OrderStatus>,
}

pub async fn find_many(
    pool: &PgPool,
    pagination: Pagination,
    filters: Filters,
) -> Result<Paginated<Order>> {
    let orders = sqlx::query_as::<_, Order>(
        "
        SELECT * FROM orders
        WHERE
            ($1::TEXT IS NULL OR user_id = $1)
            AND ($2::TEXT IS NULL OR restaurant_id = $2)
            AND ($3::order_status IS NULL OR status = $3)
        ORDER BY created_at DESC
        LIMIT $4 OFFSET $5
        ",
    )
    .bind(filters.user_id.clone())
    .bind(filters.restaurant_id.clone())
    .bind(filters.status)
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(pool)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while trying to fetch many orders: {}", err);
        Error::UnexpectedError
    })?;

    let total = sqlx::query_scalar::<_, i64>(
        "
        SELECT COUNT(id) FROM orders
        WHERE
            ($1::TEXT IS NULL OR user_id = $1)
            AND ($2::TEXT IS NULL OR restaurant_id = $2)
            AND ($3::order_status IS NULL OR status = $3)
        ",
    )
    .bind(filters.user_id)
    .bind(filters.restaurant_id)
    .bind(filters.status)
    .fetch_one(pool)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while trying to count orders: {}", err);
        Error::UnexpectedError
    })?;

    Ok(Paginated::new(
        orders,
        total as u32,
        pagination.page,
        pagination.per_page,
    ))
}

/// Moves an order to `next` only while its status still equals `current`,
/// so a concurrent transition cannot be applied twice.
pub async fn update_status<'e, E: PgExecutor<'e>>(
    e: E,
    id: String,
    current: OrderStatus,
    next: OrderStatus,
    estimated_delivery_time: Option<NaiveDateTime>,
) -> Result<Option<Order>> {
    sqlx::query_as::<_, Order>(
        "
        UPDATE orders SET
            status = $1,
            estimated_delivery_time = COALESCE($2, estimated_delivery_time),
            updated_at = NOW()
        WHERE id = $3 AND status = $4
        RETURNING *
        ",
    )
    .bind(next)
    .bind(estimated_delivery_time)
    .bind(id.clone())
    .bind(current)
    .fetch_optional(e)
    .await
    .map_err(|err| {
        tracing::error!("Error updating status for order {}: {}", id, err);
        Error::UnexpectedError
    })
}

#[cfg(test)]
mod tests {
    use super::OrderStatus;

    #[test]
    fn progression_steps_one_position_forward() {
        assert!(OrderStatus::Created.can_transition(OrderStatus::Confirmed));
        assert!(OrderStatus::Confirmed.can_transition(OrderStatus::Preparing));
        assert!(OrderStatus::Preparing.can_transition(OrderStatus::OutForDelivery));
        assert!(OrderStatus::OutForDelivery.can_transition(OrderStatus::Delivered));

        assert!(!OrderStatus::Created.can_transition(OrderStatus::Preparing));
        assert!(!OrderStatus::Confirmed.can_transition(OrderStatus::Delivered));
        assert!(!OrderStatus::Preparing.can_transition(OrderStatus::Confirmed));
    }

    #[test]
    fn cancelling_is_only_possible_before_dispatch() {
        assert!(OrderStatus::Created.can_transition(OrderStatus::Cancelled));
        assert!(OrderStatus::Confirmed.can_transition(OrderStatus::Cancelled));
        assert!(OrderStatus::Preparing.can_transition(OrderStatus::Cancelled));

        assert!(!OrderStatus::OutForDelivery.can_transition(OrderStatus::Cancelled));
        assert!(!OrderStatus::Delivered.can_transition(OrderStatus::Cancelled));
    }

    #[test]
    fn terminal_statuses_have_no_outgoing_transitions() {
        for status in [OrderStatus::Delivered, OrderStatus::Cancelled] {
            assert!(status.is_terminal());
            for next in [
                OrderStatus::Created,
                OrderStatus::Confirmed,
                OrderStatus::Preparing,
                OrderStatus::OutForDelivery,
                OrderStatus::Delivered,
                OrderStatus::Cancelled,
            ] {
                assert!(!status.can_transition(next));
            }
        }
    }
}
