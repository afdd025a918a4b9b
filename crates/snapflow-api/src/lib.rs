pub mod auth;
pub mod error;
pub mod media;
pub mod middleware;
pub mod photos;
pub mod router;
pub mod state;
pub mod token;

pub use error::ApiError;
pub use router::router;
pub use state::{AppState, AppStateInner};
