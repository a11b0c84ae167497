//! Cart pricing and synchronization engine.
//!
//! [`CartEngine`] caches the session user's cart lines and keeps them in
//! step with the backend: each mutation is sent first and the cache is then
//! updated from what the backend answered. Responses are ordered with a
//! [`RequestSequencer`], so a slow stale response cannot overwrite a newer
//! one.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use crate::{
    client::StorefrontApi,
    dto::cart::AddToCartRequest,
    error::AppError,
    models::CartLine,
    notify::NotificationCenter,
    pricing::{PricingPolicy, PricingSummary},
    sequence::{MutationOutcome, RequestSequencer, Watermarks},
    session::Shopper,
};

const MANAGE_CART_LOGIN: &str = "Please login to manage your cart";

#[derive(Debug, Default)]
struct CartState {
    lines: Vec<CartLine>,
    marks: Watermarks<Uuid>,
}

impl CartState {
    fn replace_all(&mut self, seq: u64, mut lines: Vec<CartLine>) -> bool {
        let Some(newer) = self.marks.accept_snapshot(seq) else {
            return false;
        };
        // Lines changed after the snapshot was requested keep their cached
        // state; a line missing from the cache was removed meanwhile.
        for line_id in newer {
            let cached = self.lines.iter().find(|l| l.id == line_id).cloned();
            match (lines.iter().position(|l| l.id == line_id), cached) {
                (Some(index), Some(cached)) => lines[index] = cached,
                (Some(index), None) => {
                    lines.remove(index);
                }
                (None, Some(cached)) => lines.push(cached),
                (None, None) => {}
            }
        }
        self.lines = lines;
        true
    }

    fn upsert(&mut self, seq: u64, mut line: CartLine) -> bool {
        if !self.marks.accept_key(seq, line.id) {
            return false;
        }
        match self.lines.iter_mut().find(|l| l.id == line.id) {
            Some(existing) => {
                // Keep the display snapshot if the backend did not resend it.
                if line.product.is_none() {
                    line.product = existing.product.take();
                }
                *existing = line;
            }
            None => self.lines.push(line),
        }
        true
    }

    fn remove(&mut self, seq: u64, line_id: Uuid) -> bool {
        if !self.marks.accept_key(seq, line_id) {
            return false;
        }
        self.lines.retain(|l| l.id != line_id);
        true
    }
}

pub struct CartEngine {
    api: Arc<dyn StorefrontApi>,
    shopper: Shopper,
    policy: PricingPolicy,
    notices: NotificationCenter,
    sequencer: RequestSequencer,
    state: Mutex<CartState>,
}

impl std::fmt::Debug for CartEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartEngine")
            .field("shopper", &self.shopper)
            .field("policy", &self.policy)
            .field("lines", &self.state().lines.len())
            .finish_non_exhaustive()
    }
}

impl CartEngine {
    pub fn new(api: Arc<dyn StorefrontApi>, shopper: Shopper) -> Self {
        Self {
            api,
            shopper,
            policy: PricingPolicy::default(),
            notices: NotificationCenter::default(),
            sequencer: RequestSequencer::new(),
            state: Mutex::new(CartState::default()),
        }
    }

    pub fn with_policy(mut self, policy: PricingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_notices(mut self, notices: NotificationCenter) -> Self {
        self.notices = notices;
        self
    }

    fn state(&self) -> MutexGuard<'_, CartState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) -> u64 {
        let seq = self.sequencer.next();
        self.state().marks.begin(seq);
        seq
    }

    pub fn shopper(&self) -> &Shopper {
        &self.shopper
    }

    pub fn notices(&self) -> &NotificationCenter {
        &self.notices
    }

    pub fn lines(&self) -> Vec<CartLine> {
        self.state().lines.clone()
    }

    pub fn line(&self, line_id: Uuid) -> Option<CartLine> {
        self.state().lines.iter().find(|l| l.id == line_id).cloned()
    }

    pub fn contains_product(&self, product_id: Uuid) -> bool {
        self.state().lines.iter().any(|l| l.product_id == product_id)
    }

    pub fn summary(&self) -> PricingSummary {
        PricingSummary::from_lines(&self.state().lines, &self.policy)
    }

    /// Replaces the cache with the backend's view of the cart.
    pub async fn load(&self) -> MutationOutcome {
        let Some(user_id) = self.shopper.user().map(|u| u.id) else {
            return MutationOutcome::Guest;
        };
        let seq = self.begin();
        match self.api.fetch_cart(user_id).await {
            Ok(lines) => {
                let count = lines.len();
                if self.state().replace_all(seq, lines) {
                    tracing::debug!(%user_id, lines = count, "cart loaded");
                    MutationOutcome::Applied
                } else {
                    tracing::warn!(%user_id, seq, "discarding stale cart load");
                    MutationOutcome::Stale
                }
            }
            Err(err) => {
                self.state().marks.settle(seq);
                tracing::warn!(%user_id, error = %err, "cart load failed");
                self.notices.error("Failed to load cart items, please try again");
                MutationOutcome::Failed
            }
        }
    }

    /// Adds `quantity` of a product. The backend merges into an existing line
    /// for the same product; the merged line it returns replaces ours.
    pub async fn add(&self, product_id: Uuid, quantity: i32) -> MutationOutcome {
        let Some(user_id) = self.shopper.user().map(|u| u.id) else {
            return self.guest("Please login to add items to cart");
        };
        if quantity < 1 {
            return MutationOutcome::Rejected;
        }
        let seq = self.begin();
        let request = AddToCartRequest {
            user_id,
            product_id,
            quantity,
        };
        match self.api.add_line(&request).await {
            Ok(line) => {
                let applied = self.state().upsert(seq, line);
                self.finish(applied, seq, "add", "Added to cart successfully!")
            }
            Err(err) => self.fail(seq, "add", err, "Failed to add to cart"),
        }
    }

    /// Sets a line's quantity. Quantities below 1, unknown lines and
    /// quantities above the stock the backend reported are refused without
    /// a request.
    pub async fn update_quantity(&self, line_id: Uuid, quantity: i32) -> MutationOutcome {
        if self.shopper.is_guest() {
            return self.guest(MANAGE_CART_LOGIN);
        }
        if quantity < 1 {
            return MutationOutcome::Rejected;
        }
        let Some(line) = self.line(line_id) else {
            tracing::debug!(%line_id, "quantity update for unknown line");
            return MutationOutcome::Rejected;
        };
        if let Some(stock) = line.stock().filter(|&stock| quantity > stock) {
            self.notices.error(format!("Only {stock} left in stock"));
            return MutationOutcome::Rejected;
        }

        let seq = self.begin();
        match self.api.update_quantity(line_id, quantity).await {
            Ok(updated) => {
                let applied = self.state().upsert(seq, updated);
                self.finish(applied, seq, "update_quantity", "Quantity updated")
            }
            Err(err) => self.fail(seq, "update_quantity", err, "Failed to update quantity"),
        }
    }

    pub async fn increment(&self, line_id: Uuid) -> MutationOutcome {
        match self.line(line_id) {
            Some(line) => self.update_quantity(line_id, line.quantity.saturating_add(1)).await,
            None if self.shopper.is_guest() => self.guest(MANAGE_CART_LOGIN),
            None => MutationOutcome::Rejected,
        }
    }

    pub async fn decrement(&self, line_id: Uuid) -> MutationOutcome {
        match self.line(line_id) {
            Some(line) => self.update_quantity(line_id, line.quantity.saturating_sub(1)).await,
            None if self.shopper.is_guest() => self.guest(MANAGE_CART_LOGIN),
            None => MutationOutcome::Rejected,
        }
    }

    pub async fn remove(&self, line_id: Uuid) -> MutationOutcome {
        if self.shopper.is_guest() {
            return self.guest(MANAGE_CART_LOGIN);
        }
        let seq = self.begin();
        match self.api.remove_line(line_id).await {
            Ok(()) => {
                let applied = self.state().remove(seq, line_id);
                self.finish(applied, seq, "remove", "Item removed from cart")
            }
            Err(err) => self.fail(seq, "remove", err, "Failed to remove item"),
        }
    }

    pub async fn clear(&self) -> MutationOutcome {
        let Some(user_id) = self.shopper.user().map(|u| u.id) else {
            return self.guest(MANAGE_CART_LOGIN);
        };
        let seq = self.begin();
        match self.api.clear_cart(user_id).await {
            Ok(()) => {
                let applied = self.state().replace_all(seq, Vec::new());
                self.finish(applied, seq, "clear", "Cart emptied")
            }
            Err(err) => self.fail(seq, "clear", err, "Failed to empty cart"),
        }
    }

    fn guest(&self, prompt: &str) -> MutationOutcome {
        tracing::debug!("cart change without a session");
        self.notices.error(prompt);
        MutationOutcome::Guest
    }

    fn finish(&self, applied: bool, seq: u64, action: &str, message: &str) -> MutationOutcome {
        if applied {
            tracing::info!(action, seq, "cart updated");
            self.notices.success(message);
            MutationOutcome::Applied
        } else {
            tracing::warn!(action, seq, "discarding stale cart response");
            MutationOutcome::Stale
        }
    }

    fn fail(&self, seq: u64, action: &str, err: AppError, message: &str) -> MutationOutcome {
        self.state().marks.settle(seq);
        tracing::warn!(action, error = %err, "cart request failed");
        self.notices.error(format!("{message}, please try again"));
        MutationOutcome::Failed
    }
}
