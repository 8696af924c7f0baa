mod balance_dto;

pub use balance_dto::*;
