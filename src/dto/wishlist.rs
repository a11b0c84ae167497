use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::WishlistEntry;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddWishlistRequest {
    pub user_id: Uuid,
    pub product_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct WishlistList {
    #[schema(value_type = Vec<WishlistEntry>)]
    pub items: Vec<WishlistEntry>,
}
