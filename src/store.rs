//! In-memory persistence for the reference backend.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::models::{CartLine, Product, SessionUser};

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user: SessionUser,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct WishlistRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct StoreData {
    pub users: Vec<UserRecord>,
    pub products: HashMap<Uuid, Product>,
    pub cart: Vec<CartLine>,
    pub wishlist: Vec<WishlistRecord>,
}

impl StoreData {
    pub fn user_by_email(&self, email: &str) -> Option<&UserRecord> {
        self.users
            .iter()
            .find(|u| u.user.email.eq_ignore_ascii_case(email))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Store {
    inner: Arc<RwLock<StoreData>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, StoreData> {
        self.inner.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, StoreData> {
        self.inner.write().await
    }
}
