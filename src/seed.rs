//! Demo data for the reference backend.

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    models::{Product, Role, SessionUser},
    store::{Store, UserRecord},
};

#[derive(Debug, Clone)]
pub struct SeedReport {
    pub admin_id: Uuid,
    pub customer_id: Uuid,
    pub product_ids: Vec<Uuid>,
}

pub const DEMO_CUSTOMER_EMAIL: &str = "user@example.com";
pub const DEMO_CUSTOMER_PASSWORD: &str = "user123";

pub async fn seed_demo(store: &Store) -> anyhow::Result<SeedReport> {
    let admin_id = ensure_user(store, "Store Admin", "admin@example.com", "admin123", Role::Admin).await?;
    let customer_id = ensure_user(
        store,
        "Demo Shopper",
        DEMO_CUSTOMER_EMAIL,
        DEMO_CUSTOMER_PASSWORD,
        Role::Customer,
    )
    .await?;
    let product_ids = seed_products(store).await;

    tracing::info!(%admin_id, %customer_id, products = product_ids.len(), "seed completed");
    Ok(SeedReport {
        admin_id,
        customer_id,
        product_ids,
    })
}

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();
    Ok(hash)
}

async fn ensure_user(
    store: &Store,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = store.read().await.user_by_email(email) {
        return Ok(existing.user.id);
    }

    let password_hash = hash_password(password)?;
    let user = SessionUser {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: email.to_string(),
        role,
    };
    let id = user.id;
    store.write().await.users.push(UserRecord {
        user,
        password_hash,
    });

    tracing::debug!(email, role = role.as_str(), "ensured user");
    Ok(id)
}

async fn seed_products(store: &Store) -> Vec<Uuid> {
    let products = [
        ("Linen Throw Pillow", "Home", Decimal::new(2499, 2), 10, 40),
        ("Ceramic Pour-Over Set", "Kitchen", Decimal::new(4500, 2), 0, 15),
        ("Trail Running Socks", "Apparel", Decimal::new(1200, 2), 25, 120),
        ("Walnut Desk Organizer", "Office", Decimal::new(6800, 2), 15, 8),
    ];

    let mut data = store.write().await;
    let mut ids = Vec::with_capacity(products.len());
    for (name, category, price, discount, stock) in products {
        if let Some(existing) = data.products.values().find(|p| p.name == name) {
            ids.push(existing.id);
            continue;
        }
        let id = Uuid::new_v4();
        data.products.insert(
            id,
            Product {
                id,
                name: name.to_string(),
                category: Some(category.to_string()),
                image: None,
                price,
                discount: Decimal::from(discount),
                stock,
            },
        );
        ids.push(id);
    }
    ids
}
