//! Soldi Web Server
//!
//! Axum-based REST API for the Soldi personal finance application.
//!
//! Security features:
//! - Session-token authentication (secure by default, use --no-auth for local dev)
//! - Passwords hashed with Argon2id, session tokens stored hashed
//! - Restrictive CORS policy
//! - Input validation (pagination limits, file size limits)
//! - Full audit logging for all API access (reads and writes)
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use soldi_core::auth;
use soldi_core::db::Database;
use soldi_core::models::User;

mod handlers;

/// Maximum file upload size (10 MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Maximum pagination limit
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Authorization header for session tokens and API keys
const AUTHORIZATION_HEADER: &str = "authorization";

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether authentication is required (secure by default)
    pub require_auth: bool,
    /// Allowed CORS origins (empty = same-origin only in production)
    pub allowed_origins: Vec<String>,
    /// API keys for internal service authentication (alternative to login sessions)
    /// Format: "Bearer <key>" in Authorization header
    pub api_keys: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_origins: vec![],
            api_keys: vec![],
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
}

/// The authenticated user, inserted by the auth middleware and read by
/// handlers through `Extension<CurrentUser>`
#[derive(Clone)]
pub struct CurrentUser(pub User);

/// Authentication middleware - validates session tokens and API keys
///
/// # Security Notes
///
/// **Session tokens**: The Authorization header carries `Bearer <token>`.
/// Tokens are looked up by SHA-256 digest, so the plaintext never touches
/// the database, and expired sessions are rejected at lookup.
///
/// **API keys**: Compared using constant-time comparison to prevent timing
/// attacks. API key requests act as the local user.
///
/// **--no-auth**: Every request runs as the local user. Only for development.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let bearer = request
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(str::to_string);

    // Session token auth
    if let Some(token) = bearer.as_deref() {
        match state.db.get_session_user(&auth::hash_token(token)) {
            Ok(Some(user)) => {
                info!(user = %user.email, path = %request.uri().path(), "Authenticated via session");
                request.extensions_mut().insert(CurrentUser(user));
                return next.run(request).await;
            }
            Ok(None) => {}
            Err(e) => {
                error!(error = %e, "Session lookup failed");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "error": "An internal error occurred" })),
                )
                    .into_response();
            }
        }

        // API key auth (constant-time comparison)
        if validate_api_key(token, &state.config.api_keys) {
            match state.db.get_or_create_local_user() {
                Ok(user) => {
                    info!(user = "api-key", path = %request.uri().path(), "Authenticated via API key");
                    request.extensions_mut().insert(CurrentUser(user));
                    return next.run(request).await;
                }
                Err(e) => {
                    error!(error = %e, "Failed to resolve API key user");
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(serde_json::json!({ "error": "An internal error occurred" })),
                    )
                        .into_response();
                }
            }
        }
    }

    if !state.config.require_auth {
        match state.db.get_or_create_local_user() {
            Ok(user) => {
                request.extensions_mut().insert(CurrentUser(user));
                return next.run(request).await;
            }
            Err(e) => {
                error!(error = %e, "Failed to resolve local user");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "error": "An internal error occurred" })),
                )
                    .into_response();
            }
        }
    }

    warn!(path = %request.uri().path(), "Unauthorized request - no valid session");
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "Authentication required"
        })),
    )
        .into_response()
}

/// Validate an API key against the configured keys using constant-time comparison
/// to prevent timing attacks.
fn validate_api_key(provided: &str, valid_keys: &[String]) -> bool {
    use subtle::ConstantTimeEq;

    let provided_bytes = provided.as_bytes();

    for key in valid_keys {
        let key_bytes = key.as_bytes();
        // Only compare if lengths match (constant-time for same-length keys)
        if provided_bytes.len() == key_bytes.len() && bool::from(provided_bytes.ct_eq(key_bytes)) {
            return true;
        }
    }
    false
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router
pub fn create_router(db: Database, static_dir: Option<&str>, config: ServerConfig) -> Router {
    let state = Arc::new(AppState {
        db,
        config: config.clone(),
    });

    // Login and registration live outside the session middleware
    let auth_routes = Router::new()
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login));

    let api_routes = Router::new()
        // Auth
        .route("/auth/logout", post(handlers::logout))
        .route("/me", get(handlers::get_me))
        // Dashboard
        .route("/dashboard", get(handlers::get_dashboard))
        // Accounts
        .route(
            "/accounts",
            get(handlers::list_accounts).post(handlers::create_account),
        )
        .route(
            "/accounts/:id",
            get(handlers::get_account)
                .put(handlers::update_account)
                .delete(handlers::delete_account),
        )
        .route("/accounts/:id/archive", post(handlers::archive_account))
        .route("/accounts/:id/unarchive", post(handlers::unarchive_account))
        // Transactions
        .route(
            "/transactions",
            get(handlers::list_transactions).post(handlers::create_transaction),
        )
        .route(
            "/transactions/:id",
            get(handlers::get_transaction).delete(handlers::delete_transaction),
        )
        // Categories
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/categories/:id",
            axum::routing::delete(handlers::delete_category),
        )
        .route(
            "/categories/:id/subcategories",
            post(handlers::create_subcategory),
        )
        .route(
            "/categories/:id/subcategories/:sub_id",
            axum::routing::delete(handlers::delete_subcategory),
        )
        // Reminders
        .route(
            "/reminders",
            get(handlers::list_reminders).post(handlers::create_reminder),
        )
        .route(
            "/reminders/:id",
            axum::routing::delete(handlers::delete_reminder),
        )
        // Import
        .route("/import/statement", post(handlers::import_statement))
        .route(
            "/import/statement/preview",
            post(handlers::preview_statement),
        )
        .route("/import/csv", post(handlers::import_csv))
        // Audit log
        .route("/audit", get(handlers::list_audit_log))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
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
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    // Security headers
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' blob: data:; font-src 'self'; connect-src 'self'; frame-ancestors 'none'"
    );

    let mut app = Router::new()
        .nest("/api", auth_routes.merge(api_routes))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    // Serve static files if directory provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
pub async fn serve(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
) -> anyhow::Result<()> {
    serve_with_config(db, host, port, static_dir, ServerConfig::default()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if !config.require_auth {
        warn!("⚠️  Authentication disabled - do not expose to network!");
    }

    match db.purge_expired_sessions() {
        Ok(count) if count > 0 => {
            info!("Purged {} expired session(s)", count);
        }
        Ok(_) => {}
        Err(e) => {
            warn!("Failed to purge expired sessions: {}", e);
        }
    }

    let app = create_router(db, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn unauthorized(msg: &str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

/// Map core errors to HTTP status codes where the client can act on them
pub(crate) fn core_error(err: soldi_core::Error) -> AppError {
    use soldi_core::Error;
    match err {
        Error::NotFound(ref msg) => AppError::not_found(&format!("{} not found", msg)),
        Error::InvalidData(ref msg) => AppError::bad_request(msg),
        Error::Import(ref msg) => AppError::bad_request(msg),
        other => AppError::from(other),
    }
}
