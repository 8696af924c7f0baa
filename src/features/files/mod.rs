//! Uploaded-file monitoring.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/admin/files` | Filter, sort and paginate file metadata |
//! | GET | `/api/admin/files/users` | Distinct uploaders for the user filter |
//! | GET | `/api/admin/files/export` | Filtered list as an XLSX workbook |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::FileService;
