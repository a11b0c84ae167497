use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{
    client::StorefrontApi,
    config::AppConfig,
    dto::{
        auth::{LoginRequest, LoginResponse},
        cart::{AddToCartRequest, CartList, UpdateQuantityRequest},
        products::ProductList,
        wishlist::{AddWishlistRequest, WishlistList},
    },
    error::{AppError, AppResult},
    models::{CartLine, Product, WishlistEntry},
    response::ApiResponse,
    session::Session,
};

#[derive(serde::Deserialize)]
struct ErrorBody {
    message: String,
}

/// reqwest-backed client for the storefront REST API.
#[derive(Debug, Clone)]
pub struct HttpStorefrontApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpStorefrontApi {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let client = Client::builder().timeout(config.http_timeout).build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Attaches the bearer token to every following request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_session(self, session: &Session) -> Self {
        self.with_token(session.token.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Public catalogue listing; does not need a session.
    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        let resp: ApiResponse<ProductList> = self.get("/api/product").await?;
        Ok(require_data(resp, "product")?.items)
    }

    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {t}"))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> AppResult<T> {
        let request = match self.auth_header() {
            Some(auth) => request.header(reqwest::header::AUTHORIZATION, auth),
            None => request,
        };
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> AppResult<T> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.message)
                .unwrap_or(text);
            tracing::debug!(%status, %message, "storefront request rejected");
            return Err(match status {
                StatusCode::UNAUTHORIZED => AppError::Unauthorized,
                StatusCode::FORBIDDEN => AppError::Forbidden,
                StatusCode::NOT_FOUND => AppError::NotFound,
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    AppError::BadRequest(message)
                }
                _ => AppError::Internal(anyhow::anyhow!("backend returned {status}: {message}")),
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| AppError::InvalidResponse(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        tracing::debug!(path, "GET");
        self.send(self.client.get(self.url(path))).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(&self, path: &str, body: &B) -> AppResult<T> {
        tracing::debug!(path, "POST");
        self.send(self.client.post(self.url(path)).json(body)).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + Sync>(&self, path: &str, body: &B) -> AppResult<T> {
        tracing::debug!(path, "PUT");
        self.send(self.client.put(self.url(path)).json(body)).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        tracing::debug!(path, "DELETE");
        self.send(self.client.delete(self.url(path))).await
    }
}

fn require_data<T>(response: ApiResponse<T>, what: &str) -> AppResult<T> {
    response
        .data
        .ok_or_else(|| AppError::InvalidResponse(format!("missing {what} data")))
}

#[async_trait]
impl StorefrontApi for HttpStorefrontApi {
    async fn login(&self, email: &str, password: &str) -> AppResult<Session> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let resp: ApiResponse<LoginResponse> = self.post("/api/auth/login", &request).await?;
        let LoginResponse { token, user } = require_data(resp, "login")?;
        Ok(Session { token, user })
    }

    async fn fetch_cart(&self, user_id: Uuid) -> AppResult<Vec<CartLine>> {
        let resp: ApiResponse<CartList> = self.get(&format!("/api/cart/userid/{user_id}")).await?;
        Ok(require_data(resp, "cart")?.items)
    }

    async fn add_line(&self, request: &AddToCartRequest) -> AppResult<CartLine> {
        let resp: ApiResponse<CartLine> = self.post("/api/cart/add", request).await?;
        require_data(resp, "cart line")
    }

    async fn update_quantity(&self, line_id: Uuid, quantity: i32) -> AppResult<CartLine> {
        let resp: ApiResponse<CartLine> = self
            .put(
                &format!("/api/cart/update/cartid/{line_id}"),
                &UpdateQuantityRequest { quantity },
            )
            .await?;
        require_data(resp, "cart line")
    }

    async fn remove_line(&self, line_id: Uuid) -> AppResult<()> {
        let _: ApiResponse<serde_json::Value> = self
            .delete(&format!("/api/cart/remove/cartid/{line_id}"))
            .await?;
        Ok(())
    }

    async fn clear_cart(&self, user_id: Uuid) -> AppResult<()> {
        let _: ApiResponse<serde_json::Value> = self
            .delete(&format!("/api/cart/clear/userid/{user_id}"))
            .await?;
        Ok(())
    }

    async fn fetch_wishlist(&self, user_id: Uuid) -> AppResult<Vec<WishlistEntry>> {
        let resp: ApiResponse<WishlistList> =
            self.get(&format!("/api/wishlist/userid/{user_id}")).await?;
        Ok(require_data(resp, "wishlist")?.items)
    }

    async fn add_wishlist(&self, request: &AddWishlistRequest) -> AppResult<WishlistEntry> {
        let resp: ApiResponse<WishlistEntry> = self.post("/api/wishlist", request).await?;
        require_data(resp, "wishlist entry")
    }

    async fn remove_wishlist(&self, user_id: Uuid, product_id: Uuid) -> AppResult<()> {
        let _: ApiResponse<serde_json::Value> = self
            .delete(&format!(
                "/api/wishlist/userid/{user_id}/productid/{product_id}"
            ))
            .await?;
        Ok(())
    }

    async fn clear_wishlist(&self, user_id: Uuid) -> AppResult<()> {
        let _: ApiResponse<serde_json::Value> = self
            .delete(&format!("/api/wishlist/clear/userid/{user_id}"))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_normalised() -> anyhow::Result<()> {
        let config = AppConfig {
            api_base_url: "http://shop.local:8080/".into(),
            ..AppConfig::default()
        };
        let api = HttpStorefrontApi::new(&config)?.with_token("abc");

        assert_eq!(api.base_url(), "http://shop.local:8080");
        assert_eq!(api.url("/api/cart/add"), "http://shop.local:8080/api/cart/add");
        assert_eq!(api.auth_header().as_deref(), Some("Bearer abc"));
        Ok(())
    }
}
