pub mod receipt_service;
pub mod user_service;
