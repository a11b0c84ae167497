//! Client-side wiring: configuration, stored session, HTTP client and the
//! cart and wishlist engines that share one toast area.

use std::sync::Arc;

use crate::{
    cart::CartEngine,
    client::{HttpStorefrontApi, StorefrontApi},
    config::AppConfig,
    error::AppResult,
    notify::NotificationCenter,
    session::{SessionStore, Shopper},
    wishlist::Wishlist,
};

#[derive(Debug)]
pub struct Storefront {
    config: AppConfig,
    sessions: SessionStore,
    api: HttpStorefrontApi,
    notices: NotificationCenter,
    cart: CartEngine,
    wishlist: Wishlist,
}

impl Storefront {
    /// Restores the stored session, if any, and builds engines for it.
    /// Nothing is fetched until [`Storefront::refresh`] is called.
    pub async fn open(config: AppConfig) -> AppResult<Self> {
        let sessions = SessionStore::open(&config.session_file).await;
        let api = HttpStorefrontApi::new(&config)?;
        let notices = NotificationCenter::new(config.notice_ttl);
        let (cart, wishlist) = build_engines(&config, &sessions, &api, &notices);

        Ok(Self {
            config,
            sessions,
            api,
            notices,
            cart,
            wishlist,
        })
    }

    pub fn shopper(&self) -> Shopper {
        self.sessions.shopper()
    }

    pub fn cart(&self) -> &CartEngine {
        &self.cart
    }

    pub fn wishlist(&self) -> &Wishlist {
        &self.wishlist
    }

    pub fn notices(&self) -> &NotificationCenter {
        &self.notices
    }

    /// Logs in, stores the session and switches both engines to the new
    /// user. The caches start empty.
    pub async fn login(&mut self, email: &str, password: &str) -> AppResult<Shopper> {
        let session = match self.api.login(email, password).await {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(error = %err, "login failed");
                self.notices.error("Login failed, please check your credentials");
                return Err(err);
            }
        };
        self.sessions.save(session).await?;
        self.rebuild();
        self.notices.success("Login successful");
        Ok(self.shopper())
    }

    pub async fn logout(&mut self) -> AppResult<()> {
        self.sessions.clear().await?;
        self.rebuild();
        Ok(())
    }

    /// Loads cart and wishlist concurrently.
    pub async fn refresh(&self) {
        let (cart, wishlist) = tokio::join!(self.cart.load(), self.wishlist.load());
        tracing::debug!(?cart, ?wishlist, "storefront refreshed");
    }

    fn rebuild(&mut self) {
        let (cart, wishlist) = build_engines(&self.config, &self.sessions, &self.api, &self.notices);
        self.cart = cart;
        self.wishlist = wishlist;
    }
}

fn build_engines(
    config: &AppConfig,
    sessions: &SessionStore,
    api: &HttpStorefrontApi,
    notices: &NotificationCenter,
) -> (CartEngine, Wishlist) {
    let api: Arc<dyn StorefrontApi> = match sessions.current() {
        Some(session) => Arc::new(api.clone().with_session(&session)),
        None => Arc::new(api.clone()),
    };
    let shopper = sessions.shopper();

    let cart = CartEngine::new(api.clone(), shopper.clone())
        .with_policy(config.pricing)
        .with_notices(notices.clone());
    let wishlist = Wishlist::new(api, shopper).with_notices(notices.clone());
    (cart, wishlist)
}
