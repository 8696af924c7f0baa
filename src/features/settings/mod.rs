//! MongoDB connection settings, editable at runtime.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/admin/settings` | Configured target and connection state |
//! | POST | `/api/admin/settings/test` | Try a connection without applying it |
//! | POST | `/api/admin/settings/save` | Persist the target for the next start |
//! | POST | `/api/admin/settings/apply` | Persist and reconnect now |

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::SettingsService;
