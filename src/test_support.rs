//! In-process stand-in for the storefront backend used by unit tests.

use std::{
    collections::HashMap,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    client::StorefrontApi,
    dto::{cart::AddToCartRequest, wishlist::AddWishlistRequest},
    error::{AppError, AppResult},
    models::{CartLine, Product, Role, SessionUser, WishlistEntry},
    session::Session,
};

#[derive(Debug, Default)]
struct FakeData {
    products: HashMap<Uuid, Product>,
    lines: Vec<CartLine>,
    wishlist: Vec<Uuid>,
    quantity_delays: HashMap<i32, Duration>,
    fetch_delay: Option<Duration>,
    wishlist_write_delay: Option<Duration>,
}

#[derive(Debug)]
pub struct FakeApi {
    user: SessionUser,
    data: Mutex<FakeData>,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            user: SessionUser {
                id: Uuid::new_v4(),
                name: "Test Shopper".into(),
                email: "shopper@example.com".into(),
                role: Role::Customer,
            },
            data: Mutex::new(FakeData::default()),
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    fn data(&self) -> std::sync::MutexGuard<'_, FakeData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn user(&self) -> SessionUser {
        self.user.clone()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Registers a product and returns its id.
    pub fn product(&self, price: Decimal, discount: i64, stock: i32) -> Uuid {
        let id = Uuid::new_v4();
        self.data().products.insert(
            id,
            Product {
                id,
                name: format!("Product {}", &id.to_string()[..8]),
                category: Some("Test".into()),
                image: None,
                price,
                discount: Decimal::from(discount),
                stock,
            },
        );
        id
    }

    /// Puts a line straight into the backend cart and returns its id.
    pub fn seed_line(&self, product_id: Uuid, quantity: i32) -> Uuid {
        let mut data = self.data();
        let line = Self::new_line(&data, self.user.id, product_id, quantity);
        let id = line.id;
        data.lines.push(line);
        id
    }

    pub fn seed_wishlist(&self, product_id: Uuid) {
        self.data().wishlist.push(product_id);
    }

    /// Holds back the response of any update to `quantity`.
    pub fn delay_quantity(&self, quantity: i32, delay: Duration) {
        self.data().quantity_delays.insert(quantity, delay);
    }

    /// Cart and wishlist reads capture the backend state at once but answer
    /// only after `delay`.
    pub fn delay_fetches(&self, delay: Duration) {
        self.data().fetch_delay = Some(delay);
    }

    pub fn delay_wishlist_writes(&self, delay: Duration) {
        self.data().wishlist_write_delay = Some(delay);
    }

    async fn pause(delay: Option<Duration>) {
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn new_line(data: &FakeData, user_id: Uuid, product_id: Uuid, quantity: i32) -> CartLine {
        let product = data.products.get(&product_id).cloned();
        CartLine {
            id: Uuid::new_v4(),
            user_id,
            product_id,
            quantity,
            price: product.as_ref().map(|p| p.price).unwrap_or_default(),
            discount: product.as_ref().map(|p| p.discount).unwrap_or_default(),
            product,
            created_at: None,
        }
    }

    fn begin(&self) -> AppResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Internal(anyhow::anyhow!("backend unavailable")));
        }
        Ok(())
    }
}

#[async_trait]
impl StorefrontApi for FakeApi {
    async fn login(&self, _email: &str, _password: &str) -> AppResult<Session> {
        self.begin()?;
        Ok(Session {
            token: "fake-token".into(),
            user: self.user(),
        })
    }

    async fn fetch_cart(&self, _user_id: Uuid) -> AppResult<Vec<CartLine>> {
        self.begin()?;
        let (lines, delay) = {
            let data = self.data();
            (data.lines.clone(), data.fetch_delay)
        };
        Self::pause(delay).await;
        Ok(lines)
    }

    async fn add_line(&self, request: &AddToCartRequest) -> AppResult<CartLine> {
        self.begin()?;
        let mut data = self.data();
        if let Some(line) = data
            .lines
            .iter_mut()
            .find(|l| l.product_id == request.product_id)
        {
            line.quantity += request.quantity;
            return Ok(line.clone());
        }
        let line = Self::new_line(&data, request.user_id, request.product_id, request.quantity);
        data.lines.push(line.clone());
        Ok(line)
    }

    async fn update_quantity(&self, line_id: Uuid, quantity: i32) -> AppResult<CartLine> {
        self.begin()?;
        let (mut updated, delay) = {
            let mut data = self.data();
            let delay = data.quantity_delays.get(&quantity).copied();
            let line = data
                .lines
                .iter_mut()
                .find(|l| l.id == line_id)
                .ok_or(AppError::NotFound)?;
            line.quantity = quantity;
            (line.clone(), delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        // Answer without the product snapshot, like a bare update endpoint.
        updated.product = None;
        Ok(updated)
    }

    async fn remove_line(&self, line_id: Uuid) -> AppResult<()> {
        self.begin()?;
        let mut data = self.data();
        let before = data.lines.len();
        data.lines.retain(|l| l.id != line_id);
        if data.lines.len() == before {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn clear_cart(&self, _user_id: Uuid) -> AppResult<()> {
        self.begin()?;
        self.data().lines.clear();
        Ok(())
    }

    async fn fetch_wishlist(&self, _user_id: Uuid) -> AppResult<Vec<WishlistEntry>> {
        self.begin()?;
        let (entries, delay) = {
            let data = self.data();
            let entries: Vec<WishlistEntry> = data
                .wishlist
                .iter()
                .map(|&product_id| WishlistEntry {
                    id: None,
                    product_id,
                })
                .collect();
            (entries, data.fetch_delay)
        };
        Self::pause(delay).await;
        Ok(entries)
    }

    async fn add_wishlist(&self, request: &AddWishlistRequest) -> AppResult<WishlistEntry> {
        self.begin()?;
        let delay = {
            let mut data = self.data();
            if !data.wishlist.contains(&request.product_id) {
                data.wishlist.push(request.product_id);
            }
            data.wishlist_write_delay
        };
        Self::pause(delay).await;
        Ok(WishlistEntry {
            id: Some(Uuid::new_v4()),
            product_id: request.product_id,
        })
    }

    async fn remove_wishlist(&self, _user_id: Uuid, product_id: Uuid) -> AppResult<()> {
        self.begin()?;
        let delay = {
            let mut data = self.data();
            data.wishlist.retain(|&p| p != product_id);
            data.wishlist_write_delay
        };
        Self::pause(delay).await;
        Ok(())
    }

    async fn clear_wishlist(&self, _user_id: Uuid) -> AppResult<()> {
        self.begin()?;
        self.data().wishlist.clear();
        Ok(())
    }
}
