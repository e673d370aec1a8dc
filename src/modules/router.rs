use crate::{modules, types::Context};
use axum::Router;
use std::sync::Arc;

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .nest("/restaurants", modules::restaurant::routes::get_router())
        .nest("/menu-items", modules::menu_item::routes::get_router())
        .nest(
            "/menu-item-options",
            modules::menu_item_option::routes::get_router(),
        )
        .nest("/orders", modules::order::routes::get_router())
        .nest("/reviews", modules::review::routes::get_router())
        .nest("/users", modules::user::routes::get_router())
}
