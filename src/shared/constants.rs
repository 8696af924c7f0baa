/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// COLLECTIONS
// =============================================================================

pub const FILES_COLLECTION: &str = "files";
pub const MESSAGES_COLLECTION: &str = "messages";
pub const CONVERSATIONS_COLLECTION: &str = "conversations";
pub const AGENTS_COLLECTION: &str = "agents";
pub const BALANCES_COLLECTION: &str = "balances";

/// MIME type of generated workbooks
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
