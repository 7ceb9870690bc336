//! Facade crate for Doorstep features and shared modules.
//! Re-exports domain/kernel primitives and aggregates feature routing.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Call [`init`] to obtain the combined router of all feature slices.
//! - Mount it next to the system routes from [`server::router`].

pub use doorstep_domain as domain;
pub use doorstep_kernel as kernel;

use axum::Router;
use doorstep_kernel::server::state::AppState;

pub mod server {
    pub mod router {
        pub use doorstep_kernel::server::router::system_router;
    }
}

/// Feature registry for runtime introspection.
pub mod features {
    pub use doorstep_register as register;
    pub use doorstep_upload as upload;

    /// Feature slices compiled into this build.
    pub const ENABLED: &[&str] = &["register", "upload"];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// The combined router of all enabled feature slices.
#[must_use]
pub fn init() -> Router<AppState> {
    Router::new().merge(features::register::router()).merge(features::upload::router())
}
