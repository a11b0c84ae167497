use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse},
        cart::{AddToCartRequest, CartList, UpdateQuantityRequest},
        products::ProductList,
        wishlist::{AddWishlistRequest, WishlistList},
    },
    models::{CartLine, Product, Role, SessionUser, WishlistEntry},
    pricing::PricingSummary,
    response::{ApiResponse, Meta},
    routes::{auth, cart, health, products, wishlist},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        products::list_products,
        products::get_product,
        cart::cart_list,
        cart::add_to_cart,
        cart::update_quantity,
        cart::remove_from_cart,
        cart::clear_cart,
        wishlist::list_wishlist,
        wishlist::add_to_wishlist,
        wishlist::remove_from_wishlist,
        wishlist::clear_wishlist
    ),
    components(
        schemas(
            Role,
            SessionUser,
            Product,
            CartLine,
            WishlistEntry,
            PricingSummary,
            LoginRequest,
            LoginResponse,
            AddToCartRequest,
            UpdateQuantityRequest,
            AddWishlistRequest,
            CartList,
            WishlistList,
            ProductList,
            Meta,
            ApiResponse<CartLine>,
            ApiResponse<CartList>,
            ApiResponse<WishlistList>,
            ApiResponse<ProductList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Products", description = "Product catalogue"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Wishlist", description = "Wishlist endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
