pub mod errors;
pub mod money;
pub mod ports;
pub mod receipt;
pub mod render;
pub mod user;
