//! Client-side cart pricing and synchronization for a multi-role storefront,
//! plus an in-memory reference implementation of the storefront REST API.

pub mod cart;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod pricing;
pub mod response;
pub mod routes;
pub mod seed;
pub mod sequence;
pub mod session;
pub mod state;
pub mod store;
pub mod storefront;
pub mod wishlist;

pub mod dto {
    pub mod auth;
    pub mod cart;
    pub mod products;
    pub mod wishlist;
}

pub mod middleware {
    pub mod auth;
}

pub mod services {
    pub mod auth_service;
    pub mod cart_service;
    pub mod product_service;
    pub mod wishlist_service;
}

#[cfg(test)]
pub(crate) mod test_support;
