use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;
use sqlx::PgExecutor;
use ulid::Ulid;

type Result<T> = std::result::Result<T, Error>;

#[derive(Serialize, Deserialize, Clone, Debug, sqlx::FromRow)]
pub struct MenuItemOption {
    pub id: String,
    pub name: String,
    // May be negative: an option can discount the base price.
    #[serde(with = "crate::utils::decimal")]
    pub price_modifier: BigDecimal,
    pub is_required: bool,
    pub sort_order: i32,
    pub menu_item_id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

pub struct CreateMenuItemOptionPayload {
    pub name: String,
    pub price_modifier: BigDecimal,
    pub is_required: bool,
    pub sort_order: i32,
    pub menu_item_id: String,
}

#[derive(Default)]
pub struct UpdateMenuItemOptionPayload {
    pub name: Option<String>,
    pub price_modifier: Option<BigDecimal>,
    pub is_required: Option<bool>,
    pub sort_order: Option<i32>,
}

#[derive(Debug)]
pub enum Error {
    UnexpectedError,
}

pub async fn create<'e, E: PgExecutor<'e>>(
    e: E,
    payload: CreateMenuItemOptionPayload,
) -> Result<MenuItemOption> {
    sqlx::query_as::<_, MenuItemOption>(
        "
        INSERT INTO menu_item_options (id, name, price_modifier, is_required, sort_order, menu_item_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        ",
    )
    .bind(Ulid::new().to_string())
    .bind(payload.name)
    .bind(payload.price_modifier)
    .bind(payload.is_required)
    .bind(payload.sort_order)
    .bind(payload.menu_item_id)
    .fetch_one(e)
    .await
    .map_err(|err| {
        tracing::error!(
            "Error occurred while trying to create a menu item option: {}",
            err
        );
        Error::UnexpectedError
    })
}

pub async fn find_by_id<'e, E: PgExecutor<'e>>(e: E, id: String) -> Result<Option<MenuItemOption>> {
    sqlx::query_as::<_, MenuItemOption>("SELECT * FROM menu_item_options WHERE id = $1")
        .bind(id)
        .fetch_optional(e)
        .await
        .map_err(|err| {
            tracing::error!(
                "Error occurred while trying to fetch menu item option by id: {}",
                err
            );
            Error::UnexpectedError
        })
}

pub async fn find_many_by_menu_item_id<'e, E: PgExecutor<'e>>(
    e: E,
    menu_item_id: String,
) -> Result<Vec<MenuItemOption>> {
    sqlx::query_as::<_, MenuItemOption>(
        "SELECT * FROM menu_item_options WHERE menu_item_id = $1 ORDER BY sort_order, name",
    )
    .bind(menu_item_id)
    .fetch_all(e)
    .await
    .map_err(|err| {
        tracing::error!(
            "Error occurred while trying to fetch menu item options: {}",
            err
        );
        Error::UnexpectedError
    })
}

pub async fn update_by_id<'e, E: PgExecutor<'e>>(
    e: E,
    id: String,
    payload: UpdateMenuItemOptionPayload,
) -> Result<Option<MenuItemOption>> {
    sqlx::query_as::<_, MenuItemOption>(
        "
        UPDATE menu_item_options SET
            name = COALESCE($1, name),
            price_modifier = COALESCE($2, price_modifier),
            is_required = COALESCE($3, is_required),
            sort_order = COALESCE($4, sort_order),
            updated_at = NOW()
        WHERE id = $5
        RETURNING *
        ",
    )
    .bind(payload.name)
    .bind(payload.price_modifier)
    .bind(payload.is_required)
    .bind(payload.sort_order)
    .bind(id)
    .fetch_optional(e)
    .await
    .map_err(|err| {
        tracing::error!(
            "Error occurred while trying to update menu item option: {}",
            err
        );
        Error::UnexpectedError
    })
}

pub async fn delete_by_id<'e, E: PgExecutor<'e>>(e: E, id: String) -> Result<bool> {
    sqlx::query("DELETE FROM menu_item_options WHERE id = $1")
        .bind(id)
        .execute(e)
        .await
        .map(|result| result.rows_affected() > 0)
        .map_err(|err| {
            tracing::error!(
                "Error occurred while trying to delete menu item option: {}",
                err
            );
            Error::UnexpectedError
        })
}
