//! Domain models for admin.

pub mod product;
pub mod session;

pub use product::{NewProduct, ProductInput, ValidationError, ValidationErrors};
pub use session::keys as session_keys;
