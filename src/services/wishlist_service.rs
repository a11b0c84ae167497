use chrono::Utc;
use uuid::Uuid;

use crate::{
    dto::wishlist::{AddWishlistRequest, WishlistList},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_owner},
    models::WishlistEntry,
    response::{ApiResponse, Meta},
    store::{Store, WishlistRecord},
};

fn entry(record: &WishlistRecord) -> WishlistEntry {
    WishlistEntry {
        id: Some(record.id),
        product_id: record.product_id,
    }
}

pub async fn list_wishlist(
    store: &Store,
    user: &AuthUser,
    user_id: Uuid,
) -> AppResult<ApiResponse<WishlistList>> {
    ensure_owner(user, user_id)?;
    let data = store.read().await;
    let mut records: Vec<&WishlistRecord> =
        data.wishlist.iter().filter(|w| w.user_id == user_id).collect();
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let items: Vec<WishlistEntry> = records.into_iter().map(entry).collect();

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("OK", WishlistList { items }, Some(meta)))
}

pub async fn add_to_wishlist(
    store: &Store,
    user: &AuthUser,
    payload: AddWishlistRequest,
) -> AppResult<ApiResponse<WishlistEntry>> {
    ensure_owner(user, payload.user_id)?;
    let mut data = store.write().await;

    if !data.products.contains_key(&payload.product_id) {
        return Err(AppError::BadRequest("Product not found".into()));
    }

    let existing = data
        .wishlist
        .iter()
        .find(|w| w.user_id == payload.user_id && w.product_id == payload.product_id)
        .map(entry);

    let saved = match existing {
        Some(found) => found,
        None => {
            let record = WishlistRecord {
                id: Uuid::new_v4(),
                user_id: payload.user_id,
                product_id: payload.product_id,
                created_at: Utc::now(),
            };
            let saved = entry(&record);
            data.wishlist.push(record);
            saved
        }
    };

    tracing::info!(user_id = %payload.user_id, product_id = %payload.product_id, "wishlist entry added");
    Ok(ApiResponse::success(
        "Added to wishlist",
        saved,
        Some(Meta::empty()),
    ))
}

pub async fn remove_from_wishlist(
    store: &Store,
    user: &AuthUser,
    user_id: Uuid,
    product_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_owner(user, user_id)?;
    let mut data = store.write().await;
    let before = data.wishlist.len();
    data.wishlist
        .retain(|w| !(w.user_id == user_id && w.product_id == product_id));

    if data.wishlist.len() == before {
        return Err(AppError::NotFound);
    }

    tracing::info!(%user_id, %product_id, "wishlist entry removed");
    Ok(ApiResponse::success(
        "Removed from wishlist",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn clear_wishlist(
    store: &Store,
    user: &AuthUser,
    user_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_owner(user, user_id)?;
    store.write().await.wishlist.retain(|w| w.user_id != user_id);

    tracing::info!(%user_id, "wishlist cleared");
    Ok(ApiResponse::success(
        "Wishlist cleared",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
