//! Agent categories with a contiguous, administrator-controlled order.
//!
//! Every create, move and delete leaves the `order` values of the whole
//! collection at exactly `1..=N`, and `value` unique per record.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/admin/categories` | List categories by order |
//! | POST | `/api/admin/categories` | Create a category from a name |
//! | POST | `/api/admin/categories/{id}/move/{direction}` | Swap with a neighbour |
//! | DELETE | `/api/admin/categories/{id}` | Delete and renumber |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod stores;

pub use routes::routes;
pub use services::CategoryService;
pub use stores::MongoCategoryStore;
