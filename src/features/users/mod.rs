//! LibreChat user accounts.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/admin/users` | Search by email, sort and paginate |
//! | PATCH | `/api/admin/users/{id}/role` | Change a user's role |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::UserService;
