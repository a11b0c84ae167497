use chrono::Utc;
use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, CartList, UpdateQuantityRequest},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_owner},
    models::{CartLine, Product},
    response::{ApiResponse, Meta},
    store::{Store, StoreData},
};

fn check_stock(product: &Product, quantity: i32) -> AppResult<()> {
    if quantity > product.stock {
        return Err(AppError::BadRequest(format!(
            "only {} left in stock",
            product.stock
        )));
    }
    Ok(())
}

fn with_current_product(data: &StoreData, mut line: CartLine) -> CartLine {
    line.product = data.products.get(&line.product_id).cloned();
    line
}

pub async fn list_cart(
    store: &Store,
    user: &AuthUser,
    user_id: Uuid,
) -> AppResult<ApiResponse<CartList>> {
    ensure_owner(user, user_id)?;
    let data = store.read().await;
    let items: Vec<CartLine> = data
        .cart
        .iter()
        .filter(|line| line.user_id == user_id)
        .cloned()
        .map(|line| with_current_product(&data, line))
        .collect();

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("OK", CartList { items }, Some(meta)))
}

/// Adds to the user's cart, merging into the existing line for the product.
pub async fn add_to_cart(
    store: &Store,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartLine>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }
    ensure_owner(user, payload.user_id)?;

    let mut data = store.write().await;
    let product = data
        .products
        .get(&payload.product_id)
        .cloned()
        .ok_or_else(|| AppError::BadRequest("product not found".to_string()))?;

    let existing = data
        .cart
        .iter()
        .position(|l| l.user_id == payload.user_id && l.product_id == payload.product_id);

    let line = match existing {
        Some(index) => {
            let line = &mut data.cart[index];
            let quantity = line.quantity.saturating_add(payload.quantity);
            check_stock(&product, quantity)?;
            line.quantity = quantity;
            line.product = Some(product);
            line.clone()
        }
        None => {
            check_stock(&product, payload.quantity)?;
            let line = CartLine {
                id: Uuid::new_v4(),
                user_id: payload.user_id,
                product_id: product.id,
                quantity: payload.quantity,
                price: product.price,
                discount: product.discount,
                product: Some(product),
                created_at: Some(Utc::now()),
            };
            data.cart.push(line.clone());
            line
        }
    };

    tracing::info!(
        user_id = %payload.user_id,
        product_id = %payload.product_id,
        quantity = line.quantity,
        "cart line saved"
    );
    Ok(ApiResponse::success("OK", line, Some(Meta::empty())))
}

pub async fn update_quantity(
    store: &Store,
    user: &AuthUser,
    line_id: Uuid,
    payload: UpdateQuantityRequest,
) -> AppResult<ApiResponse<CartLine>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let mut data = store.write().await;
    let index = data
        .cart
        .iter()
        .position(|l| l.id == line_id)
        .ok_or(AppError::NotFound)?;
    ensure_owner(user, data.cart[index].user_id)?;

    let product = data.products.get(&data.cart[index].product_id).cloned();
    if let Some(product) = &product {
        check_stock(product, payload.quantity)?;
    }

    let line = &mut data.cart[index];
    line.quantity = payload.quantity;
    line.product = product;
    let line = line.clone();

    tracing::info!(%line_id, quantity = payload.quantity, "cart quantity updated");
    Ok(ApiResponse::success("OK", line, Some(Meta::empty())))
}

pub async fn remove_from_cart(
    store: &Store,
    user: &AuthUser,
    line_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let mut data = store.write().await;
    let index = data
        .cart
        .iter()
        .position(|l| l.id == line_id)
        .ok_or(AppError::NotFound)?;
    ensure_owner(user, data.cart[index].user_id)?;
    data.cart.remove(index);

    tracing::info!(%line_id, "cart line removed");
    Ok(ApiResponse::success(
        "Removed from cart",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn clear_cart(
    store: &Store,
    user: &AuthUser,
    user_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_owner(user, user_id)?;
    let mut data = store.write().await;
    let before = data.cart.len();
    data.cart.retain(|l| l.user_id != user_id);

    tracing::info!(%user_id, removed = before - data.cart.len(), "cart cleared");
    Ok(ApiResponse::success(
        "Cart cleared",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
