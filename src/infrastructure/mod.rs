pub mod models;
pub mod receipt_repo;
pub mod storage;
pub mod user_repo;

#[cfg(test)]
pub(crate) mod memory;
#[cfg(test)]
pub(crate) mod test_support;
