use std::sync::Arc;

use rust_decimal::Decimal;
use storefront_cart::{
    cart::CartEngine,
    client::{HttpStorefrontApi, StorefrontApi},
    config::AppConfig,
    notify::NoticeKind,
    routes::create_app,
    seed::{DEMO_CUSTOMER_EMAIL, DEMO_CUSTOMER_PASSWORD, SeedReport, seed_demo},
    sequence::MutationOutcome,
    session::{SessionStore, Shopper},
    state::AppState,
    store::Store,
    storefront::Storefront,
    wishlist::Wishlist,
};

// Serves the in-memory backend on an ephemeral port and returns a client for it.
async fn spawn_backend() -> anyhow::Result<(HttpStorefrontApi, SeedReport)> {
    let store = Store::new();
    let report = seed_demo(&store).await?;
    let app = create_app(AppState::new(store, "flow-test-secret"));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let config = AppConfig {
        api_base_url: format!("http://{addr}"),
        ..AppConfig::default()
    };
    Ok((HttpStorefrontApi::new(&config)?, report))
}

fn money(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

// Login -> persisted session -> add/merge/update/remove/clear, checking the priced summary at each step.
#[tokio::test]
async fn logged_in_shopper_syncs_cart_and_wishlist() -> anyhow::Result<()> {
    let (api, report) = spawn_backend().await?;
    let catalogue = api.list_products().await?;
    assert_eq!(catalogue.len(), report.product_ids.len());

    let session = api.login(DEMO_CUSTOMER_EMAIL, DEMO_CUSTOMER_PASSWORD).await?;
    assert_eq!(session.user.id, report.customer_id);

    let dir = tempfile::tempdir()?;
    let sessions = SessionStore::open(dir.path().join("session.json")).await;
    sessions.save(session.clone()).await?;
    let reopened = SessionStore::open(dir.path().join("session.json")).await;
    let shopper = reopened.shopper();
    assert_eq!(shopper, Shopper::Member(session.user.clone()));

    let authed: Arc<dyn StorefrontApi> = Arc::new(api.clone().with_session(&session));
    let cart = CartEngine::new(authed.clone(), shopper.clone());
    assert_eq!(cart.load().await, MutationOutcome::Applied);
    assert!(cart.summary().is_empty());
    assert_eq!(cart.summary().final_amount, Decimal::ZERO);

    // Ceramic Pour-Over Set: 45.00, no discount, 15 in stock.
    let pour_over = report.product_ids[1];
    assert_eq!(cart.add(pour_over, 1).await, MutationOutcome::Applied);
    let summary = cart.summary();
    assert_eq!(summary.total_price, money(4500));
    assert_eq!(summary.delivery_fee, money(999));
    assert_eq!(summary.final_amount, money(6399));

    // A second add merges into the same line and crosses the free delivery threshold.
    assert_eq!(cart.add(pour_over, 1).await, MutationOutcome::Applied);
    let lines = cart.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 2);
    assert!(cart.summary().has_free_delivery());
    assert_eq!(cart.summary().final_amount, money(9900));

    let line_id = lines[0].id;
    assert_eq!(cart.increment(line_id).await, MutationOutcome::Applied);
    assert_eq!(cart.summary().final_amount, money(14400));
    assert_eq!(
        cart.update_quantity(line_id, 16).await,
        MutationOutcome::Rejected
    );
    let notice = cart.notices().current().expect("stock notice");
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.text, "Only 15 left in stock");

    // Trail Running Socks: 12.00 at 25% off.
    let socks = report.product_ids[2];
    assert_eq!(cart.add(socks, 1).await, MutationOutcome::Applied);
    let summary = cart.summary();
    assert_eq!(summary.total_price, money(14700));
    assert_eq!(summary.total_discount, money(300));
    assert_eq!(summary.final_amount, money(15300));
    assert_eq!(summary.unit_count, 4);

    // A fresh engine sees the same cart after reload.
    let other_tab = CartEngine::new(authed.clone(), shopper.clone());
    assert_eq!(other_tab.load().await, MutationOutcome::Applied);
    assert_eq!(other_tab.summary(), cart.summary());

    let socks_line = cart
        .lines()
        .into_iter()
        .find(|l| l.product_id == socks)
        .expect("socks line");
    assert_eq!(cart.remove(socks_line.id).await, MutationOutcome::Applied);
    assert!(!cart.contains_product(socks));

    assert_eq!(cart.clear().await, MutationOutcome::Applied);
    assert!(cart.lines().is_empty());
    assert_eq!(authed.fetch_cart(session.user.id).await?.len(), 0);

    let wishlist = Wishlist::new(authed.clone(), shopper.clone());
    assert_eq!(wishlist.load().await, MutationOutcome::Applied);
    assert_eq!(wishlist.toggle(pour_over).await, MutationOutcome::Applied);
    assert!(wishlist.contains(pour_over));
    assert_eq!(authed.fetch_wishlist(session.user.id).await?.len(), 1);
    assert_eq!(wishlist.toggle(pour_over).await, MutationOutcome::Applied);
    assert!(wishlist.is_empty());

    sessions.clear().await?;
    assert!(SessionStore::open(dir.path().join("session.json")).await.current().is_none());
    Ok(())
}

#[tokio::test]
async fn rejected_credentials_and_foreign_carts_surface_as_failures() -> anyhow::Result<()> {
    let (api, report) = spawn_backend().await?;

    assert!(api.login(DEMO_CUSTOMER_EMAIL, "not-the-password").await.is_err());

    // A token that does not verify makes every sync fail with a toast.
    let forged: Arc<dyn StorefrontApi> = Arc::new(api.clone().with_token("forged"));
    let session = api.login(DEMO_CUSTOMER_EMAIL, DEMO_CUSTOMER_PASSWORD).await?;
    let cart = CartEngine::new(forged, Shopper::Member(session.user.clone()));
    assert_eq!(cart.load().await, MutationOutcome::Failed);
    assert_eq!(
        cart.notices().current().map(|n| n.text),
        Some("Failed to load cart items, please try again".to_string())
    );

    // Customers cannot read someone else's cart.
    let authed = api.clone().with_session(&session);
    assert!(authed.fetch_cart(report.admin_id).await.is_err());
    Ok(())
}

#[tokio::test]
async fn guest_engines_never_reach_the_backend() -> anyhow::Result<()> {
    let (api, report) = spawn_backend().await?;
    let api: Arc<dyn StorefrontApi> = Arc::new(api);

    let cart = CartEngine::new(api.clone(), Shopper::Guest);
    assert_eq!(cart.load().await, MutationOutcome::Guest);
    assert!(cart.notices().current().is_none());
    assert_eq!(cart.add(report.product_ids[0], 1).await, MutationOutcome::Guest);
    assert!(cart.summary().is_empty());
    let prompt = cart.notices().current().expect("login prompt");
    assert_eq!(prompt.kind, NoticeKind::Error);
    assert_eq!(prompt.text, "Please login to add items to cart");

    let wishlist = Wishlist::new(api, Shopper::Guest);
    assert_eq!(wishlist.toggle(report.product_ids[0]).await, MutationOutcome::Guest);
    assert_eq!(
        wishlist.notices().current().map(|n| n.text),
        Some("Please login to add items to wishlist".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn storefront_restores_session_across_restarts() -> anyhow::Result<()> {
    let (api, report) = spawn_backend().await?;
    let dir = tempfile::tempdir()?;
    let config = AppConfig {
        api_base_url: api.base_url().to_string(),
        session_file: dir.path().join("session.json"),
        ..AppConfig::default()
    };

    let mut storefront = Storefront::open(config.clone()).await?;
    assert!(storefront.shopper().is_guest());
    assert!(storefront.login(DEMO_CUSTOMER_EMAIL, "wrong").await.is_err());
    assert_eq!(
        storefront.notices().current().map(|n| n.kind),
        Some(NoticeKind::Error)
    );

    storefront
        .login(DEMO_CUSTOMER_EMAIL, DEMO_CUSTOMER_PASSWORD)
        .await?;
    let linen = report.product_ids[0];
    assert_eq!(storefront.cart().add(linen, 2).await, MutationOutcome::Applied);
    assert_eq!(storefront.wishlist().toggle(linen).await, MutationOutcome::Applied);

    // A second process picks the stored session up from disk.
    let restarted = Storefront::open(config).await?;
    assert_eq!(
        restarted.shopper().user().map(|u| u.id),
        Some(report.customer_id)
    );
    restarted.refresh().await;
    assert_eq!(restarted.cart().summary().unit_count, 2);
    assert!(restarted.wishlist().contains(linen));

    storefront.logout().await?;
    assert!(storefront.shopper().is_guest());
    assert_eq!(storefront.cart().load().await, MutationOutcome::Guest);
    Ok(())
}
