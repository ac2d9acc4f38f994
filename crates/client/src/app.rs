//! Application root: owns the stores and the API client.

use domain::{
    CartStore, CatalogEntity, CheckoutService, DeliveryDetails, ItemId, LineKind, LoginForm,
    LoginResponse, OrderConfirmation, OrderRecord, OtpCode, PackageForm, ProductForm,
    SessionStore, SignupForm, UserProfile, ValidationErrors,
};
use storage::{FileStorage, StateStorage};

use crate::api::{ApiClient, CatalogPage, OrderPage};
use crate::config::Config;
use crate::error::ClientError;

/// The cart, the session and the API client, wired together.
///
/// Both stores are rehydrated when the app is opened, and the client's bearer
/// token always follows the session store.
pub struct App<S: StateStorage + Clone> {
    config: Config,
    cart: CartStore<S>,
    session: SessionStore<S>,
    api: ApiClient,
}

impl App<FileStorage> {
    /// Opens the app with state kept under `config.state_dir`.
    pub fn from_config(config: Config) -> Result<Self, ClientError> {
        let storage = FileStorage::open(&config.state_dir)?;
        let api = ApiClient::from_config(&config)?;
        Self::open(config, storage, api)
    }
}

impl<S: StateStorage + Clone> App<S> {
    /// Rehydrates both stores from `storage`.
    #[tracing::instrument(skip_all)]
    pub fn open(config: Config, storage: S, api: ApiClient) -> Result<Self, ClientError> {
        let cart = CartStore::open(storage.clone())?;
        let session = SessionStore::open(storage)?;
        let api = api.with_token(session.user_token().map(str::to_string));
        tracing::debug!(
            lines = cart.items().len(),
            authenticated = session.is_authenticated(),
            "state rehydrated"
        );
        Ok(Self {
            config,
            cart,
            session,
            api,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cart(&self) -> &CartStore<S> {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut CartStore<S> {
        &mut self.cart
    }

    pub fn session(&self) -> &SessionStore<S> {
        &self.session
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    fn sync_token(&mut self) {
        self.api
            .set_token(self.session.user_token().map(str::to_string));
    }

    /// Fails unless a user is logged in.
    pub fn require_auth(&self) -> Result<(), ClientError> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(ClientError::NotAuthenticated)
        }
    }

    /// Fails unless the logged-in user is an admin.
    pub fn require_admin(&self) -> Result<(), ClientError> {
        self.require_auth()?;
        if self.session.is_admin() {
            Ok(())
        } else {
            Err(ClientError::Forbidden)
        }
    }

    // Authentication

    /// Validates the form, logs in and stores the returned profile and token.
    ///
    /// A response without a token leaves the session anonymous and is
    /// reported as `NotAuthenticated`.
    pub async fn login(&mut self, form: &LoginForm) -> Result<&UserProfile, ClientError> {
        form.validate()?;
        let response = self.api.login(form).await?;
        self.session.set_user_data(&response)?;
        self.sync_token();
        if !self.session.is_authenticated() {
            tracing::warn!(email = %response.data.email, "login response carried no token");
            return Err(ClientError::NotAuthenticated);
        }
        tracing::info!(email = %response.data.email, "logged in");
        self.session
            .user_data()
            .ok_or(ClientError::NotAuthenticated)
    }

    /// Creates an account and remembers the email for verification.
    pub async fn signup(&mut self, form: &SignupForm) -> Result<(), ClientError> {
        form.validate()?;
        self.api.signup(form).await?;
        let pending = LoginResponse {
            data: UserProfile::with_email(form.email.trim()),
            token: None,
        };
        self.session.set_user_data(&pending)?;
        self.sync_token();
        Ok(())
    }

    fn pending_email(&self) -> Result<String, ClientError> {
        match self.session.user_data() {
            Some(profile) if !profile.email.is_empty() => Ok(profile.email.clone()),
            _ => {
                let mut errors = ValidationErrors::new();
                errors.add("email", "Sign up first to receive a verification code");
                Err(errors.into())
            }
        }
    }

    /// Verifies the emailed code for the email remembered at signup.
    pub async fn verify_otp(&self, code: &str) -> Result<(), ClientError> {
        let otp = OtpCode::parse(code)?;
        let email = self.pending_email()?;
        self.api.verify_otp(&email, &otp).await?;
        tracing::info!(%email, "email verified");
        Ok(())
    }

    /// Asks for a new verification code.
    pub async fn resend_otp(&self) -> Result<(), ClientError> {
        let email = self.pending_email()?;
        self.api.resend_otp(&email).await?;
        Ok(())
    }

    /// Forgets the logged-in user.
    pub fn logout(&mut self) -> Result<(), ClientError> {
        self.session.clear_user_data()?;
        self.sync_token();
        Ok(())
    }

    // Catalog

    pub async fn products(&self, page: u32, limit: u32) -> Result<CatalogPage, ClientError> {
        self.api.products(page, limit).await
    }

    pub async fn packages(&self, page: u32, limit: u32) -> Result<CatalogPage, ClientError> {
        self.api.packages(page, limit).await
    }

    /// Finds a product or package by id, walking the catalog pages.
    pub async fn find_entity(
        &self,
        kind: LineKind,
        id: &ItemId,
    ) -> Result<Option<CatalogEntity>, ClientError> {
        let limit = self.config.page_size;
        let mut page = 1;
        loop {
            let listing = match kind {
                LineKind::Product => self.api.products(page, limit).await?,
                LineKind::Package => self.api.packages(page, limit).await?,
            };
            if let Some(entity) = listing.items.iter().find(|e| &e.id == id) {
                return Ok(Some(entity.clone()));
            }
            if listing.items.is_empty() || page >= listing.total_pages() {
                return Ok(None);
            }
            page += 1;
        }
    }

    // Cart

    /// Adds a catalog entity to the cart.
    ///
    /// Returns `false` without touching the cart when the id is already
    /// there; quantities change through increase and decrease.
    pub async fn add_to_cart(&mut self, kind: LineKind, id: &ItemId) -> Result<bool, ClientError> {
        self.require_auth()?;
        if self.cart.contains(id) {
            tracing::debug!(item_id = %id, "already in cart");
            return Ok(false);
        }
        let entity = self.find_entity(kind, id).await?.ok_or_else(|| ClientError::Api {
            status: 404,
            message: format!("{kind} {id} not found"),
        })?;
        self.cart.add_item(&entity)?;
        Ok(true)
    }

    // Orders

    /// Places the cart as an order.
    pub async fn place_order(
        &mut self,
        details: &DeliveryDetails,
    ) -> Result<OrderConfirmation, ClientError> {
        self.require_auth()?;
        let checkout = CheckoutService::new(self.api.clone());
        Ok(checkout.place_order(&mut self.cart, details).await?)
    }

    pub async fn order_history(&self) -> Result<Vec<OrderRecord>, ClientError> {
        self.require_auth()?;
        self.api.order_history().await
    }

    // Administration

    pub async fn create_product(&self, form: &ProductForm) -> Result<CatalogEntity, ClientError> {
        self.require_admin()?;
        form.validate()?;
        let entity = self.api.create_product(form).await?;
        tracing::info!(id = %entity.id, name = %entity.name, "product created");
        Ok(entity)
    }

    pub async fn create_package(&self, form: &PackageForm) -> Result<CatalogEntity, ClientError> {
        self.require_admin()?;
        form.validate()?;
        let entity = self.api.create_package(form).await?;
        tracing::info!(id = %entity.id, name = %entity.name, "package created");
        Ok(entity)
    }

    /// Lists every customer's orders, paginated.
    pub async fn all_orders(&self, page: u32, limit: u32) -> Result<OrderPage, ClientError> {
        self.require_admin()?;
        self.api.my_orders(page, limit).await
    }
}

#[cfg(test)]
mod tests {
    use domain::Money;
    use storage::InMemoryStorage;

    use super::*;

    fn app_with(storage: InMemoryStorage) -> App<InMemoryStorage> {
        App::open(
            Config::default(),
            storage,
            ApiClient::new("http://127.0.0.1:9"),
        )
        .unwrap()
    }

    #[test]
    fn token_is_restored_from_session_store() {
        let storage = InMemoryStorage::new();
        {
            let mut session = SessionStore::open(storage.clone()).unwrap();
            session
                .set_user_data(&LoginResponse {
                    data: UserProfile::with_email("a@b.c"),
                    token: Some("jwt".to_string()),
                })
                .unwrap();
        }

        let app = app_with(storage);
        assert!(app.require_auth().is_ok());
        assert_eq!(app.api().token(), Some("jwt"));
    }

    #[test]
    fn logout_clears_token() {
        let storage = InMemoryStorage::new();
        {
            let mut session = SessionStore::open(storage.clone()).unwrap();
            session
                .set_user_data(&LoginResponse {
                    data: UserProfile::with_email("a@b.c"),
                    token: Some("jwt".to_string()),
                })
                .unwrap();
        }

        let mut app = app_with(storage);
        app.logout().unwrap();
        assert!(app.api().token().is_none());
        assert!(matches!(
            app.require_auth(),
            Err(ClientError::NotAuthenticated)
        ));
    }

    #[test]
    fn cart_and_session_share_storage_under_separate_keys() {
        let storage = InMemoryStorage::new();
        let mut app = app_with(storage.clone());
        app.cart_mut()
            .add_item(&CatalogEntity::product("p1", "Tea", Money::from_dollars(3)))
            .unwrap();

        assert!(storage.get_item("data-storage").unwrap().is_some());
        assert!(storage.get_item("user-store").unwrap().is_none());
    }

    #[test]
    fn from_config_keeps_state_under_state_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            state_dir: dir.path().join("state"),
            ..Config::default()
        };

        {
            let mut app = App::from_config(config.clone()).unwrap();
            app.cart_mut()
                .add_item(&CatalogEntity::product("p1", "Tea", Money::from_dollars(3)))
                .unwrap();
        }

        let app = App::from_config(config).unwrap();
        assert_eq!(app.cart().items().len(), 1);
        assert_eq!(app.cart().total_amount(), Money::from_dollars(3));
        assert!(dir.path().join("state").join("data-storage.json").exists());
    }

    #[tokio::test]
    async fn admin_actions_require_admin_role() {
        let storage = InMemoryStorage::new();
        let mut app = app_with(storage.clone());
        let form = ProductForm::default();

        assert!(matches!(
            app.create_product(&form).await,
            Err(ClientError::NotAuthenticated)
        ));

        app.session
            .set_user_data(&LoginResponse {
                data: UserProfile::with_email("a@b.c"),
                token: Some("jwt".to_string()),
            })
            .unwrap();
        assert!(matches!(
            app.all_orders(1, 10).await,
            Err(ClientError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn place_order_requires_login() {
        let mut app = app_with(InMemoryStorage::new());
        let result = app
            .place_order(&DeliveryDetails::new("0911", "Bole"))
            .await;
        assert!(matches!(result, Err(ClientError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn verify_without_signup_fails_before_any_request() {
        let app = app_with(InMemoryStorage::new());
        let err = app.verify_otp("ab12").await.unwrap_err();
        match err {
            ClientError::Validation(errors) => assert!(errors.get("email").is_some()),
            other => panic!("unexpected error: {other}"),
        }

        let err = app.verify_otp("a!").await.unwrap_err();
        match err {
            ClientError::Validation(errors) => assert!(errors.get("otp").is_some()),
            other => panic!("unexpected error: {other}"),
        }
    }
}
