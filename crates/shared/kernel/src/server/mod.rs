pub mod csrf;
pub mod error;
pub mod flash;
pub mod health;
pub mod router;
pub mod state;
pub mod templates;

pub use error::{PageError, PageFailure};
pub use state::AppState;
pub use templates::Templates;
