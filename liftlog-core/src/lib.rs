pub mod db;
pub mod error;
pub mod validate;

pub use error::StoreError;
