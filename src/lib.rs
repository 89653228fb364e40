//! Car-booking administration backend: REST API over bookings, cars,
//! companies and users, plus the typed client SDK and edit-form controllers
//! the admin frontend drives it with.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod schema;
pub mod state;
pub mod store;

pub use client::{ApiClient, ClientError};
pub use config::Config;
pub use error::{AppError, AuthError, FieldError};
pub use routes::{api_routes, health_routes};
pub use state::AppState;
