use std::sync::Arc;

use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(store: Store, jwt_secret: impl Into<Arc<str>>) -> Self {
        Self {
            store,
            jwt_secret: jwt_secret.into(),
        }
    }
}
