pub mod auth;
pub mod discussions;
pub mod docs;
pub mod feed;
pub mod groups;
pub mod middleware;
pub mod papers;
pub mod sessions;
pub mod state;

// Re-export the pieces the binary needs to build the web server router.
pub use docs::ApiDoc;
pub use middleware::require_auth;
pub use state::AppState;
