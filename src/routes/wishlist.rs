use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::{
    dto::wishlist::{AddWishlistRequest, WishlistList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::WishlistEntry,
    response::ApiResponse,
    services::wishlist_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(add_to_wishlist))
        .route("/userid/{user_id}", get(list_wishlist))
        .route(
            "/userid/{user_id}/productid/{product_id}",
            delete(remove_from_wishlist),
        )
        .route("/clear/userid/{user_id}", delete(clear_wishlist))
}

#[utoipa::path(
    get,
    path = "/api/wishlist/userid/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "Wishlist owner")
    ),
    responses(
        (status = 200, description = "Wishlisted product ids", body = ApiResponse<WishlistList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn list_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<WishlistList>>> {
    let resp = wishlist_service::list_wishlist(&state.store, &user, user_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/wishlist",
    request_body = AddWishlistRequest,
    responses(
        (status = 200, description = "Added to wishlist", body = ApiResponse<WishlistEntry>),
        (status = 400, description = "Bad Request"),
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn add_to_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddWishlistRequest>,
) -> AppResult<Json<ApiResponse<WishlistEntry>>> {
    let resp = wishlist_service::add_to_wishlist(&state.store, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/wishlist/userid/{user_id}/productid/{product_id}",
    params(
        ("user_id" = Uuid, Path, description = "Wishlist owner"),
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Removed from wishlist", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Not wishlisted")
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path((user_id, product_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp =
        wishlist_service::remove_from_wishlist(&state.store, &user, user_id, product_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/wishlist/clear/userid/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "Wishlist owner")
    ),
    responses(
        (status = 200, description = "Wishlist cleared", body = ApiResponse<serde_json::Value>)
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn clear_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = wishlist_service::clear_wishlist(&state.store, &user, user_id).await?;
    Ok(Json(resp))
}
