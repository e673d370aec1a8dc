pub mod auth;
pub mod menu_item;
pub mod menu_item_option;
pub mod order;
pub mod restaurant;
pub mod review;
pub mod user;

mod router;
pub use router::get_router;
