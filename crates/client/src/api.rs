//! HTTP client for the ordering API.

use async_trait::async_trait;
use domain::{
    CatalogEntity, GatewayError, LoginForm, LoginResponse, OrderConfirmation, OrderDraft,
    OrderGateway, OrderRecord, OtpCode, PackageForm, ProductForm, SignupForm,
};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::ClientError;

/// Default page for paginated requests.
pub const DEFAULT_PAGE: u32 = 1;

/// Default page size for catalog listings.
pub const DEFAULT_LIMIT: u32 = 5;

/// Default page size for the user's order list.
pub const DEFAULT_ORDERS_LIMIT: u32 = 10;

/// Pagination details the API attaches to a listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

/// One page of products or packages.
///
/// The API nests the entities under `products` or `packages` depending on
/// the listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogPage {
    #[serde(default, alias = "products", alias = "packages")]
    pub items: Vec<CatalogEntity>,

    #[serde(default)]
    pub table: TableInfo,
}

impl CatalogPage {
    /// Returns the number of pages, treating a missing table as one page.
    pub fn total_pages(&self) -> u32 {
        self.table.total_pages.unwrap_or(1)
    }
}

/// One page of the orders visible to the logged-in user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderPage {
    #[serde(default, alias = "orders")]
    pub items: Vec<OrderRecord>,

    #[serde(default)]
    pub table: TableInfo,
}

impl OrderPage {
    pub fn total_pages(&self) -> u32 {
        self.table.total_pages.unwrap_or(1)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OrderListing {
    Wrapped { data: OrderPage },
    WrappedList { data: Vec<OrderRecord> },
    List(Vec<OrderRecord>),
    Page(OrderPage),
}

impl From<OrderListing> for OrderPage {
    fn from(listing: OrderListing) -> Self {
        match listing {
            OrderListing::Wrapped { data } | OrderListing::Page(data) => data,
            OrderListing::WrappedList { data: items } | OrderListing::List(items) => OrderPage {
                items,
                table: TableInfo::default(),
            },
        }
    }
}

/// Returns the `data` object of a response body, or the body itself.
fn payload(mut body: serde_json::Value) -> serde_json::Value {
    match body.get_mut("data") {
        Some(data) if data.is_object() => data.take(),
        _ => body,
    }
}

/// The `{ "data": ... }` wrapper used by most responses.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LoginBody {
    Wrapped { data: LoginResponse },
    Bare(LoginResponse),
}

impl From<LoginBody> for LoginResponse {
    fn from(body: LoginBody) -> Self {
        match body {
            LoginBody::Wrapped { data } | LoginBody::Bare(data) => data,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Serialize)]
struct OtpRequest<'a> {
    email: &'a str,
    otp: &'a str,
}

#[derive(Serialize)]
struct EmailRequest<'a> {
    email: &'a str,
}

/// Client for the ordering REST API.
///
/// Every request carries `Authorization: Bearer <token>` once a token is set.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Creates a client for `base_url` with default HTTP settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Sets or clears the bearer token. Empty tokens are treated as none.
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token.filter(|t| !t.is_empty());
    }

    /// Returns a copy of this client carrying `token`.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.set_token(token);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = self.authorize(request).send().await?;
        let response = Self::check_status(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn check_status(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .or_else(|| (!body.is_empty()).then(|| body.clone()))
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
        tracing::debug!(status = status.as_u16(), %message, "API request failed");
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// `GET /{path}?page=&limit=`.
    #[tracing::instrument(skip(self))]
    pub async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        page: u32,
        limit: u32,
    ) -> Result<T, ClientError> {
        let request = self
            .client
            .get(self.url(path))
            .query(&[("page", page), ("limit", limit)]);
        self.send(request).await
    }

    /// `GET /{path}` without pagination.
    #[tracing::instrument(skip(self))]
    pub async fn get_all<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(self.client.get(self.url(path))).await
    }

    /// `POST /{path}` with a JSON body.
    #[tracing::instrument(skip(self, body))]
    pub async fn create<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.send(self.client.post(self.url(path)).json(body)).await
    }

    /// Lists one page of products.
    pub async fn products(&self, page: u32, limit: u32) -> Result<CatalogPage, ClientError> {
        let envelope: Envelope<CatalogPage> = self.get_page("products", page, limit).await?;
        Ok(Self::tag_products(envelope.data))
    }

    /// Lists one page of packages.
    pub async fn packages(&self, page: u32, limit: u32) -> Result<CatalogPage, ClientError> {
        let envelope: Envelope<CatalogPage> = self.get_page("packages", page, limit).await?;
        Ok(Self::tag_packages(envelope.data))
    }

    // A product listing never holds packages.
    fn tag_products(mut page: CatalogPage) -> CatalogPage {
        for entity in &mut page.items {
            entity.include = None;
        }
        page
    }

    // A package without `include` still has to become a package line.
    fn tag_packages(mut page: CatalogPage) -> CatalogPage {
        for entity in &mut page.items {
            entity.include.get_or_insert_with(Vec::new);
        }
        page
    }

    /// Lists orders, paginated. Admins see every customer's orders.
    pub async fn my_orders(&self, page: u32, limit: u32) -> Result<OrderPage, ClientError> {
        let listing: OrderListing = self.get_page("orders", page, limit).await?;
        Ok(listing.into())
    }

    /// Adds a product to the catalog.
    #[tracing::instrument(skip(self, form), fields(name = %form.name))]
    pub async fn create_product(&self, form: &ProductForm) -> Result<CatalogEntity, ClientError> {
        let body: serde_json::Value = self.create("products", form).await?;
        let mut entity: CatalogEntity = serde_json::from_value(payload(body))?;
        entity.include = None;
        Ok(entity)
    }

    /// Adds a package bundling existing products to the catalog.
    #[tracing::instrument(skip(self, form), fields(name = %form.name))]
    pub async fn create_package(&self, form: &PackageForm) -> Result<CatalogEntity, ClientError> {
        let body: serde_json::Value = self.create("packages", form).await?;
        let mut entity: CatalogEntity = serde_json::from_value(payload(body))?;
        entity.include.get_or_insert_with(Vec::new);
        Ok(entity)
    }

    /// Returns the user's order history, most recent first.
    pub async fn order_history(&self) -> Result<Vec<OrderRecord>, ClientError> {
        self.get_all("orders/user/history").await
    }

    /// Submits an order draft.
    #[tracing::instrument(skip(self, draft), fields(lines = draft.items.len()))]
    pub async fn submit_order(&self, draft: &OrderDraft) -> Result<OrderConfirmation, ClientError> {
        let body: serde_json::Value = self.create("orders", draft).await?;
        match serde_json::from_value(payload(body)) {
            Ok(confirmation) => Ok(confirmation),
            Err(e) => {
                tracing::warn!(error = %e, "unrecognised order confirmation, assuming pending");
                Ok(OrderConfirmation::default())
            }
        }
    }

    /// Logs in with email and password.
    #[tracing::instrument(skip(self, form), fields(email = %form.email))]
    pub async fn login(&self, form: &LoginForm) -> Result<LoginResponse, ClientError> {
        let body: LoginBody = self.create("auth/login", form).await?;
        Ok(body.into())
    }

    /// Creates an account; the server then emails a verification code.
    #[tracing::instrument(skip(self, form), fields(email = %form.email))]
    pub async fn signup(&self, form: &SignupForm) -> Result<serde_json::Value, ClientError> {
        self.create("auth/signup", form).await
    }

    /// Verifies the code emailed after signup.
    #[tracing::instrument(skip(self, otp))]
    pub async fn verify_otp(
        &self,
        email: &str,
        otp: &OtpCode,
    ) -> Result<serde_json::Value, ClientError> {
        let body = OtpRequest {
            email,
            otp: otp.as_str(),
        };
        self.create("auth/verify-otp", &body).await
    }

    /// Asks the server to send a new verification code.
    #[tracing::instrument(skip(self))]
    pub async fn resend_otp(&self, email: &str) -> Result<serde_json::Value, ClientError> {
        self.create("auth/resend-otp", &EmailRequest { email }).await
    }
}

#[async_trait]
impl OrderGateway for ApiClient {
    async fn submit_order(&self, draft: &OrderDraft) -> Result<OrderConfirmation, GatewayError> {
        ApiClient::submit_order(self, draft)
            .await
            .map_err(GatewayError::from)
    }

    async fn order_history(&self) -> Result<Vec<OrderRecord>, GatewayError> {
        ApiClient::order_history(self)
            .await
            .map_err(GatewayError::from)
    }
}
