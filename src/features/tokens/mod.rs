//! Token usage report built from LibreChat's message log.
//!
//! Every assistant reply counts as one turn: its own `tokenCount` is output,
//! and the user message it answers (its parent) supplies the input tokens.
//! Turns are summed per day, user email and model.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/admin/tokens` | Daily usage rows, paginated |
//! | GET | `/api/admin/tokens/agents` | Agents for the model filter |
//! | GET | `/api/admin/tokens/export` | Usage rows as an XLSX workbook |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::TokenService;
