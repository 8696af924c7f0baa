//! Single shared-credential login gate for the admin API.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/api/auth/login` | No | Exchange the admin credential for a session |
//! | POST | `/api/auth/logout` | No | Clear the session cookie |
//! | GET | `/api/auth/me` | Yes | Current session |

pub mod cookie;
pub mod dtos;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod services;
mod validator;

pub use services::AuthService;
pub use validator::JwtValidator;
