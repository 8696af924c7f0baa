pub mod bson_datetime;
pub mod constants;
pub mod format;
pub mod spreadsheet;
pub mod test_helpers;
pub mod types;
pub mod validation;
