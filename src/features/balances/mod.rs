//! Per-user token balances.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/admin/balances` | Balances joined with user email and name |
//! | GET | `/api/admin/balances/refill-units` | Accepted auto-refill interval units |
//! | PUT | `/api/admin/balances/{id}` | Edit credits and auto-refill settings |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::BalanceService;
