//! services/api/src/bin/api.rs

use api_lib::{
    adapters::MemoryStore,
    config::Config,
    error::ApiError,
    web::{
        auth::{login_handler, logout_handler, me_handler, signup_handler},
        discussions::{
            create_post_handler, create_reply_handler, get_thread_handler, list_posts_handler,
            vote_post_handler, vote_reply_handler,
        },
        feed::{leaderboard_handler, recent_activity_handler, user_activity_handler},
        groups::{
            create_group_handler, get_group_handler, join_group_handler, list_groups_handler,
            list_members_handler, my_groups_handler, remove_member_handler,
        },
        papers::{
            create_paper_handler, download_paper_handler, get_paper_handler, list_papers_handler,
        },
        require_auth,
        sessions::{create_session_handler, group_sessions_handler, upcoming_sessions_handler},
        ApiDoc, AppState,
    },
};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Build the Storage Adapter ---
    // All state is process-lifetime; it vanishes on restart.
    let store = Arc::new(MemoryStore::new());

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        store,
        config: config.clone(),
    });

    let cors = tower_http::cors::CorsLayer::new()
        .allow_origin(
            config
                .cors_origin
                .parse::<HeaderValue>()
                .map_err(|e| ApiError::Internal(format!("Invalid CORS_ORIGIN: {}", e)))?,
        )
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/auth/me", get(me_handler))
        .route("/papers", post(create_paper_handler).get(list_papers_handler))
        .route("/papers/{id}", get(get_paper_handler))
        .route("/papers/{id}/download", post(download_paper_handler))
        .route("/discussions", post(create_post_handler).get(list_posts_handler))
        .route("/discussions/{id}", get(get_thread_handler))
        .route("/discussions/{id}/replies", post(create_reply_handler))
        .route("/discussions/{id}/vote", post(vote_post_handler))
        .route("/replies/{id}/vote", post(vote_reply_handler))
        .route("/study-groups", post(create_group_handler).get(list_groups_handler))
        .route("/study-groups/mine", get(my_groups_handler))
        .route("/study-groups/{id}", get(get_group_handler))
        .route("/study-groups/{id}/members", get(list_members_handler))
        .route("/study-groups/{id}/join", post(join_group_handler))
        .route(
            "/study-groups/{id}/members/{user_id}",
            delete(remove_member_handler),
        )
        .route("/study-groups/{id}/sessions", get(group_sessions_handler))
        .route("/study-sessions", post(create_session_handler))
        .route("/study-sessions/upcoming", get(upcoming_sessions_handler))
        .route("/activity", get(recent_activity_handler))
        .route("/users/{id}/activity", get(user_activity_handler))
        .route("/leaderboard", get(leaderboard_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
