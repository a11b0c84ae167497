//! Wishlist membership, used to render the heart icon on listing and cart
//! views. Same consistency model as the cart engine.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use uuid::Uuid;

use crate::{
    client::StorefrontApi,
    dto::wishlist::AddWishlistRequest,
    notify::NotificationCenter,
    sequence::{MutationOutcome, RequestSequencer, Watermarks},
    session::Shopper,
};

#[derive(Debug, Default)]
struct WishlistState {
    products: HashSet<Uuid>,
    marks: Watermarks<Uuid>,
}

impl WishlistState {
    fn replace_all(&mut self, seq: u64, mut products: HashSet<Uuid>) -> bool {
        let Some(newer) = self.marks.accept_snapshot(seq) else {
            return false;
        };
        // Toggled after the snapshot was requested: the cached membership wins.
        for product_id in newer {
            if self.products.contains(&product_id) {
                products.insert(product_id);
            } else {
                products.remove(&product_id);
            }
        }
        self.products = products;
        true
    }
}

pub struct Wishlist {
    api: Arc<dyn StorefrontApi>,
    shopper: Shopper,
    notices: NotificationCenter,
    sequencer: RequestSequencer,
    state: Mutex<WishlistState>,
}

impl std::fmt::Debug for Wishlist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wishlist")
            .field("shopper", &self.shopper)
            .field("products", &self.state().products.len())
            .finish_non_exhaustive()
    }
}

impl Wishlist {
    pub fn new(api: Arc<dyn StorefrontApi>, shopper: Shopper) -> Self {
        Self {
            api,
            shopper,
            notices: NotificationCenter::default(),
            sequencer: RequestSequencer::new(),
            state: Mutex::new(WishlistState::default()),
        }
    }

    pub fn with_notices(mut self, notices: NotificationCenter) -> Self {
        self.notices = notices;
        self
    }

    fn state(&self) -> MutexGuard<'_, WishlistState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) -> u64 {
        let seq = self.sequencer.next();
        self.state().marks.begin(seq);
        seq
    }

    fn guest(&self, prompt: &str) -> MutationOutcome {
        tracing::debug!("wishlist change without a session");
        self.notices.error(prompt);
        MutationOutcome::Guest
    }

    pub fn notices(&self) -> &NotificationCenter {
        &self.notices
    }

    pub fn contains(&self, product_id: Uuid) -> bool {
        self.state().products.contains(&product_id)
    }

    pub fn len(&self) -> usize {
        self.state().products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().products.is_empty()
    }

    pub fn product_ids(&self) -> HashSet<Uuid> {
        self.state().products.clone()
    }

    pub async fn load(&self) -> MutationOutcome {
        let Some(user_id) = self.shopper.user().map(|u| u.id) else {
            return MutationOutcome::Guest;
        };
        let seq = self.begin();
        match self.api.fetch_wishlist(user_id).await {
            Ok(entries) => {
                let mut state = self.state();
                let products = entries.into_iter().map(|e| e.product_id).collect();
                if !state.replace_all(seq, products) {
                    tracing::warn!(%user_id, seq, "discarding stale wishlist load");
                    return MutationOutcome::Stale;
                }
                tracing::debug!(%user_id, products = state.products.len(), "wishlist loaded");
                MutationOutcome::Applied
            }
            Err(err) => {
                self.state().marks.settle(seq);
                tracing::warn!(%user_id, error = %err, "wishlist load failed");
                self.notices.error("Failed to load wishlist items, please try again");
                MutationOutcome::Failed
            }
        }
    }

    /// Removes the product if it is wishlisted, adds it otherwise.
    pub async fn toggle(&self, product_id: Uuid) -> MutationOutcome {
        let Some(user_id) = self.shopper.user().map(|u| u.id) else {
            return self.guest("Please login to add items to wishlist");
        };
        let present = self.contains(product_id);
        let seq = self.begin();

        let result = if present {
            self.api.remove_wishlist(user_id, product_id).await
        } else {
            let request = AddWishlistRequest {
                user_id,
                product_id,
            };
            self.api.add_wishlist(&request).await.map(|_| ())
        };

        if let Err(err) = result {
            self.state().marks.settle(seq);
            tracing::warn!(%product_id, error = %err, "wishlist toggle failed");
            self.notices.error("Failed to update wishlist, please try again");
            return MutationOutcome::Failed;
        }

        let applied = {
            let mut state = self.state();
            if state.marks.accept_key(seq, product_id) {
                if present {
                    state.products.remove(&product_id);
                } else {
                    state.products.insert(product_id);
                }
                true
            } else {
                false
            }
        };
        if !applied {
            tracing::warn!(%product_id, seq, "discarding stale wishlist response");
            return MutationOutcome::Stale;
        }

        tracing::info!(%product_id, added = !present, "wishlist updated");
        self.notices.success(if present {
            "Removed from wishlist"
        } else {
            "Added to wishlist"
        });
        MutationOutcome::Applied
    }

    pub async fn clear(&self) -> MutationOutcome {
        let Some(user_id) = self.shopper.user().map(|u| u.id) else {
            return self.guest("Please login to manage your wishlist");
        };
        let seq = self.begin();
        if let Err(err) = self.api.clear_wishlist(user_id).await {
            self.state().marks.settle(seq);
            tracing::warn!(%user_id, error = %err, "wishlist clear failed");
            self.notices.error("Failed to clear wishlist, please try again");
            return MutationOutcome::Failed;
        }

        let applied = self.state().replace_all(seq, HashSet::new());
        if !applied {
            tracing::warn!(%user_id, seq, "discarding stale wishlist clear");
            return MutationOutcome::Stale;
        }
        self.notices.success("Wishlist cleared");
        MutationOutcome::Applied
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rust_decimal::Decimal;

    use super::*;
    use crate::{notify::NoticeKind, test_support::FakeApi};

    fn wishlist(api: &Arc<FakeApi>) -> Wishlist {
        Wishlist::new(api.clone(), Shopper::Member(api.user()))
    }

    #[tokio::test]
    async fn toggle_adds_then_removes() {
        let api = Arc::new(FakeApi::new());
        let product = api.product(Decimal::from(12), 0, 5);
        let list = wishlist(&api);

        assert!(list.toggle(product).await.is_applied());
        assert!(list.contains(product));
        assert_eq!(list.notices().current().map(|n| n.text), Some("Added to wishlist".into()));

        assert!(list.toggle(product).await.is_applied());
        assert!(!list.contains(product));
        assert_eq!(api.calls(), 2);
    }

    #[tokio::test]
    async fn load_reflects_backend_membership() {
        let api = Arc::new(FakeApi::new());
        let a = api.product(Decimal::from(1), 0, 5);
        let b = api.product(Decimal::from(2), 0, 5);
        api.seed_wishlist(a);
        api.seed_wishlist(b);
        let list = wishlist(&api);

        assert!(list.load().await.is_applied());
        assert_eq!(list.len(), 2);
        assert!(list.contains(a) && list.contains(b));

        assert!(list.clear().await.is_applied());
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn failed_toggle_leaves_set_unchanged() {
        let api = Arc::new(FakeApi::new());
        let product = api.product(Decimal::from(12), 0, 5);
        api.seed_wishlist(product);
        let list = wishlist(&api);
        list.load().await;

        api.set_failing(true);
        assert_eq!(list.toggle(product).await, MutationOutcome::Failed);

        assert!(list.contains(product));
        let notice = list.notices().current().expect("error toast");
        assert_eq!(notice.kind, NoticeKind::Error);
    }

    #[tokio::test]
    async fn guest_toggle_sends_nothing() {
        let api = Arc::new(FakeApi::new());
        let list = Wishlist::new(api.clone(), Shopper::Guest);

        assert_eq!(list.load().await, MutationOutcome::Guest);
        assert!(list.notices().current().is_none());

        assert_eq!(list.toggle(Uuid::new_v4()).await, MutationOutcome::Guest);
        assert_eq!(
            list.notices().current().map(|n| n.text),
            Some("Please login to add items to wishlist".to_string())
        );
        assert_eq!(list.clear().await, MutationOutcome::Guest);
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_during_slow_load_keeps_both_products() {
        let api = Arc::new(FakeApi::new());
        let a = api.product(Decimal::from(1), 0, 5);
        let b = api.product(Decimal::from(2), 0, 5);
        api.seed_wishlist(a);
        api.delay_fetches(Duration::from_millis(200));
        let list = wishlist(&api);

        let (load, toggle) = tokio::join!(list.load(), list.toggle(b));

        assert_eq!(load, MutationOutcome::Applied);
        assert_eq!(toggle, MutationOutcome::Applied);
        assert!(list.contains(a));
        assert!(list.contains(b));
        assert_eq!(list.len(), 2);
    }

    #[tokio::test]
    async fn failed_clear_leaves_set_unchanged() {
        let api = Arc::new(FakeApi::new());
        let product = api.product(Decimal::from(12), 0, 5);
        api.seed_wishlist(product);
        let list = wishlist(&api);
        list.load().await;

        api.set_failing(true);
        assert_eq!(list.clear().await, MutationOutcome::Failed);

        assert!(list.contains(product));
        let notice = list.notices().current().expect("error toast");
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.text, "Failed to clear wishlist, please try again");
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_answered_after_newer_clear_is_stale() {
        let api = Arc::new(FakeApi::new());
        let product = api.product(Decimal::from(12), 0, 5);
        let list = wishlist(&api);
        list.load().await;
        api.delay_wishlist_writes(Duration::from_millis(200));

        let (toggle, clear) = tokio::join!(list.toggle(product), list.clear());

        assert_eq!(clear, MutationOutcome::Applied);
        assert_eq!(toggle, MutationOutcome::Stale);
        assert!(list.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn load_answered_after_newer_clear_is_stale() {
        let api = Arc::new(FakeApi::new());
        let product = api.product(Decimal::from(12), 0, 5);
        api.seed_wishlist(product);
        api.delay_fetches(Duration::from_millis(200));
        let list = wishlist(&api);

        let (load, clear) = tokio::join!(list.load(), list.clear());

        assert_eq!(clear, MutationOutcome::Applied);
        assert_eq!(load, MutationOutcome::Stale);
        assert!(list.is_empty());
    }
}
