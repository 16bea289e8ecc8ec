/// Application state and router builder
///
/// `AppState` is constructed once at startup with every backend already
/// chosen, so the router itself never touches configuration beyond CORS and
/// security headers. Tests build the same router over in-memory backends.
///
/// # Example
///
/// ```no_run
/// use contacts_api::{app::{build_router, AppState}, config::Config};
/// use contacts_shared::{
///     auth::jwt::TokenIssuer,
///     cache::MemoryIdentityCache,
///     services::{AuthGateway, ContactsGateway, DisabledMailer, DisabledMedia},
///     store::{MemoryContactStore, MemoryUserStore},
/// };
/// use std::sync::Arc;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let auth = AuthGateway::new(
///     Arc::new(MemoryUserStore::new()),
///     Arc::new(MemoryIdentityCache::new()),
///     Arc::new(DisabledMailer),
///     Arc::new(DisabledMedia),
///     TokenIssuer::new(config.jwt.secret.clone(), chrono::Duration::minutes(30)),
/// );
/// let contacts = ContactsGateway::new(Arc::new(MemoryContactStore::new()));
///
/// let app = build_router(AppState::new(auth, contacts, config));
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{auth::require_auth, security::SecurityHeadersLayer},
    routes,
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use contacts_shared::services::{AuthGateway, ContactsGateway};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into each handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthGateway>,
    pub contacts: Arc<ContactsGateway>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(auth: AuthGateway, contacts: ContactsGateway, config: Config) -> Self {
        Self {
            auth: Arc::new(auth),
            contacts: Arc::new(contacts),
            config: Arc::new(config),
        }
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_allows_any() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET  /                          # Welcome (public)
/// ├── GET  /health                    # Health check (public)
/// ├── /auth/
/// │   ├── POST /register              # public
/// │   ├── POST /login                 # public
/// │   ├── POST /verify/:user_id       # public
/// │   ├── GET  /me                    # bearer
/// │   └── POST /avatar                # bearer, multipart
/// └── /contacts/                      # bearer
///     ├── POST   /
///     ├── GET    /
///     ├── GET    /birthdays/upcoming
///     ├── GET    /:id
///     ├── PUT    /:id
///     └── DELETE /:id
/// ```
pub fn build_router(state: AppState) -> Router {
    let require_auth = axum::middleware::from_fn_with_state(state.clone(), require_auth);

    let public_auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/verify/:user_id", post(routes::auth::verify_email));

    let protected_auth_routes = Router::new()
        .route("/me", get(routes::auth::me))
        .route("/avatar", post(routes::auth::upload_avatar))
        .route_layer(require_auth.clone());

    let contact_routes = Router::new()
        .route(
            "/",
            post(routes::contacts::create_contact).get(routes::contacts::list_contacts),
        )
        .route(
            "/birthdays/upcoming",
            get(routes::contacts::upcoming_birthdays),
        )
        .route(
            "/:id",
            get(routes::contacts::get_contact)
                .put(routes::contacts::update_contact)
                .delete(routes::contacts::delete_contact),
        )
        .route_layer(require_auth);

    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health_check))
        .nest("/auth", public_auth_routes.merge(protected_auth_routes))
        .nest("/contacts", contact_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}
