use uuid::Uuid;

use crate::{
    dto::products::ProductList,
    error::{AppError, AppResult},
    models::Product,
    response::{ApiResponse, Meta},
    store::Store,
};

pub async fn list_products(store: &Store) -> AppResult<ApiResponse<ProductList>> {
    let mut items: Vec<Product> = store.read().await.products.values().cloned().collect();
    items.sort_by(|a, b| a.name.cmp(&b.name));

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("OK", ProductList { items }, Some(meta)))
}

pub async fn get_product(store: &Store, product_id: Uuid) -> AppResult<ApiResponse<Product>> {
    let product = store
        .read()
        .await
        .products
        .get(&product_id)
        .cloned()
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success("OK", product, Some(Meta::empty())))
}
