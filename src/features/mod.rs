pub mod auth;
pub mod balances;
pub mod categories;
pub mod files;
pub mod settings;
pub mod tokens;
pub mod users;
