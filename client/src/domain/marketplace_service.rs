//! Façade over the endpoint groups used by marketplace views.
//!
//! The service keeps the cached profile in the shared [`SessionStore`] in
//! step with login, registration, profile updates and logout. It adds no
//! refresh policy of its own; every call goes through the client's single
//! interceptor.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::domain::api_client::ApiClient;
use crate::domain::auth::{
    AuthGrant, AuthSession, LoginCredentials, Registration, RegistrationOutcome,
};
use crate::domain::error::{ApiError, ApiResult, ErrorCode};
use crate::domain::models::{
    Cart, Category, ChatMessage, Conversation, NewOrder, Order, OrderStatus, Product,
    ProductDraft, ProductQuery, ProfileUpdate, User,
};
use crate::domain::request::FilePart;
use crate::domain::session::SessionStore;

/// High-level marketplace operations.
#[derive(Debug, Clone)]
pub struct MarketplaceService {
    client: ApiClient,
}

impl MarketplaceService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Underlying client, for endpoint groups the façade does not wrap.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Shared session store.
    pub fn session(&self) -> &SessionStore {
        self.client.session()
    }

    /// Façade whose every request is aborted when `token` fires.
    #[must_use]
    pub fn scoped(&self, token: CancellationToken) -> Self {
        Self {
            client: self.client.with_cancellation(token),
        }
    }

    /// Whether an access token is stored.
    pub fn is_authenticated(&self) -> ApiResult<bool> {
        Ok(self.session().is_authenticated()?)
    }

    /// Profile cached by the last login, registration or profile fetch.
    pub fn cached_user(&self) -> ApiResult<Option<User>> {
        Ok(self.session().cached_user()?)
    }

    /// Authenticate and open a session.
    ///
    /// # Errors
    ///
    /// Returns the login fallback's error, or the profile lookup's error when
    /// the login response omitted the profile and it could not be fetched.
    pub async fn login(&self, credentials: &LoginCredentials) -> ApiResult<AuthSession> {
        let grant = self.client.auth().login(credentials).await?;
        self.open_session(grant).await
    }

    /// Create an account and, when possible, open a session for it.
    ///
    /// When the registration response carries no access token, a login with
    /// the submitted credentials is attempted before settling for
    /// [`RegistrationOutcome::RequiresManualLogin`].
    ///
    /// # Errors
    ///
    /// Returns the registration call's error, or a cancellation raised while
    /// opening the session.
    pub async fn register(&self, registration: &Registration) -> ApiResult<RegistrationOutcome> {
        let grant = self.client.auth().register(registration).await?;
        if grant.tokens.is_some() {
            return self
                .open_session(grant)
                .await
                .map(RegistrationOutcome::Authenticated);
        }

        let registered_user = grant.user;
        let Ok(credentials) = registration.credentials() else {
            return Ok(RegistrationOutcome::RequiresManualLogin {
                user: registered_user,
            });
        };
        match self.login(&credentials).await {
            Ok(session) => Ok(RegistrationOutcome::Authenticated(session)),
            Err(error) if error.code() == ErrorCode::Cancelled => Err(error),
            Err(error) => {
                warn!(
                    code = ?error.code(),
                    reason = error.message(),
                    "automatic login after registration failed"
                );
                Ok(RegistrationOutcome::RequiresManualLogin {
                    user: registered_user,
                })
            }
        }
    }

    /// End the session.
    ///
    /// The server-side logout needs the refresh token and is best effort;
    /// local state is cleared whatever its outcome.
    ///
    /// # Errors
    ///
    /// Returns a configuration error only when the session store fails.
    pub async fn logout(&self) -> ApiResult<()> {
        let session = self.session();
        if let Some(refresh_token) = session.refresh_token()? {
            if let Err(error) = self.client.auth().logout(&refresh_token).await {
                warn!(code = ?error.code(), "server-side logout failed; clearing locally");
            }
        }
        session.clear()?;
        info!("session closed");
        Ok(())
    }

    /// Fetch the authenticated profile and refresh the cached copy.
    pub async fn current_user(&self) -> ApiResult<User> {
        let user = self.client.auth().current_user().await?;
        self.session().set_cached_user(&user)?;
        Ok(user)
    }

    /// Apply a partial profile update and refresh the cached copy.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<User> {
        let user = self.client.users().update_me(update).await?;
        self.session().set_cached_user(&user)?;
        Ok(user)
    }

    pub async fn products(&self, query: &ProductQuery) -> ApiResult<Vec<Product>> {
        self.client.products().list(query).await
    }

    pub async fn product(&self, id: u64) -> ApiResult<Product> {
        self.client.products().get(id).await
    }

    pub async fn my_products(&self) -> ApiResult<Vec<Product>> {
        self.client.products().mine().await
    }

    pub async fn search_products(&self, term: &str) -> ApiResult<Vec<Product>> {
        self.client.products().search(term).await
    }

    pub async fn categories(&self) -> ApiResult<Vec<Category>> {
        self.client.products().categories().await
    }

    pub async fn create_product(&self, draft: &ProductDraft) -> ApiResult<Product> {
        self.client.products().create(draft).await
    }

    pub async fn update_product(&self, id: u64, draft: &ProductDraft) -> ApiResult<Product> {
        self.client.products().update(id, draft).await
    }

    pub async fn delete_product(&self, id: u64) -> ApiResult<()> {
        self.client.products().delete(id).await
    }

    pub async fn upload_product_image(&self, id: u64, image: FilePart) -> ApiResult<Product> {
        self.client.products().upload_image(id, image).await
    }

    pub async fn cart(&self) -> ApiResult<Cart> {
        self.client.cart().get().await
    }

    /// Add a product and return the updated cart.
    pub async fn add_to_cart(&self, product_id: u64, quantity: u32) -> ApiResult<Cart> {
        self.client.cart().add(product_id, quantity).await?;
        self.cart().await
    }

    /// Change a line's quantity and return the updated cart.
    pub async fn update_cart_item(&self, item_id: u64, quantity: u32) -> ApiResult<Cart> {
        self.client.cart().update_item(item_id, quantity).await?;
        self.cart().await
    }

    /// Remove a line and return the updated cart.
    pub async fn remove_cart_item(&self, item_id: u64) -> ApiResult<Cart> {
        self.client.cart().remove_item(item_id).await?;
        self.cart().await
    }

    pub async fn clear_cart(&self) -> ApiResult<()> {
        self.client.cart().clear().await
    }

    pub async fn orders(&self) -> ApiResult<Vec<Order>> {
        self.client.orders().list().await
    }

    pub async fn order(&self, id: u64) -> ApiResult<Order> {
        self.client.orders().get(id).await
    }

    pub async fn place_order(&self, order: &NewOrder) -> ApiResult<Order> {
        self.client.orders().create(order).await
    }

    pub async fn update_order_status(&self, id: u64, status: OrderStatus) -> ApiResult<Order> {
        self.client.orders().update_status(id, status).await
    }

    pub async fn cancel_order(&self, id: u64) -> ApiResult<()> {
        self.client.orders().cancel(id).await
    }

    /// Orders containing the acting farmer's products.
    pub async fn farmer_orders(&self) -> ApiResult<Vec<Order>> {
        let farmer = self.acting_user().await?;
        self.client.orders().farmer_orders(farmer.id).await
    }

    /// Active orders the acting delivery agent can work.
    pub async fn delivery_orders(&self) -> ApiResult<Vec<Order>> {
        let agent = self.acting_user().await?;
        self.client.orders().delivery_orders(agent.id).await
    }

    pub async fn conversations(&self) -> ApiResult<Vec<Conversation>> {
        self.client.chat().conversations().await
    }

    pub async fn start_conversation(&self, participant_id: u64) -> ApiResult<Conversation> {
        self.client.chat().start_conversation(participant_id).await
    }

    pub async fn messages(&self, conversation_id: u64) -> ApiResult<Vec<ChatMessage>> {
        self.client.chat().messages(conversation_id).await
    }

    pub async fn send_message(
        &self,
        conversation_id: u64,
        content: &str,
    ) -> ApiResult<ChatMessage> {
        self.client.chat().send_message(conversation_id, content).await
    }

    pub async fn mark_conversation_read(&self, conversation_id: u64) -> ApiResult<()> {
        self.client.chat().mark_read(conversation_id).await
    }

    pub async fn unread_count(&self) -> ApiResult<u64> {
        self.client.chat().unread_count().await
    }

    /// Replace any previous session with the grant and resolve the profile.
    ///
    /// A grant without a profile triggers a lookup; if that fails the new
    /// session is torn down so no half-open session survives.
    async fn open_session(&self, grant: AuthGrant) -> ApiResult<AuthSession> {
        let Some(tokens) = grant.tokens else {
            return Err(ApiError::invalid_response("No access token was issued."));
        };
        let session = self.session();
        session.replace_tokens(&tokens.access, tokens.refresh.as_deref())?;

        let user = match grant.user {
            Some(user) => user,
            None => match self.client.auth().current_user().await {
                Ok(user) => user,
                Err(error) => {
                    session.clear()?;
                    return Err(error);
                }
            },
        };
        session.set_cached_user(&user)?;
        info!(user_id = user.id, role = user.role.as_str(), "session opened");
        Ok(AuthSession {
            user,
            token: tokens.access,
        })
    }

    async fn acting_user(&self) -> ApiResult<User> {
        match self.cached_user()? {
            Some(user) => Ok(user),
            None => self.current_user().await,
        }
    }
}
