//! Access to the storefront REST backend.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    dto::{cart::AddToCartRequest, wishlist::AddWishlistRequest},
    error::AppResult,
    models::{CartLine, WishlistEntry},
    session::Session,
};

pub mod http;

pub use http::HttpStorefrontApi;

/// Remote operations the cart and wishlist engines depend on.
#[async_trait]
pub trait StorefrontApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> AppResult<Session>;

    async fn fetch_cart(&self, user_id: Uuid) -> AppResult<Vec<CartLine>>;
    /// The backend merges into an existing line for the same product.
    async fn add_line(&self, request: &AddToCartRequest) -> AppResult<CartLine>;
    async fn update_quantity(&self, line_id: Uuid, quantity: i32) -> AppResult<CartLine>;
    async fn remove_line(&self, line_id: Uuid) -> AppResult<()>;
    async fn clear_cart(&self, user_id: Uuid) -> AppResult<()>;

    async fn fetch_wishlist(&self, user_id: Uuid) -> AppResult<Vec<WishlistEntry>>;
    async fn add_wishlist(&self, request: &AddWishlistRequest) -> AppResult<WishlistEntry>;
    async fn remove_wishlist(&self, user_id: Uuid, product_id: Uuid) -> AppResult<()>;
    async fn clear_wishlist(&self, user_id: Uuid) -> AppResult<()>;
}
