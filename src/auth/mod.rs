pub mod claims;
mod extractors;
pub mod jwt;
pub mod services;

pub use extractors::{AdminUser, AuthUser, Principal};
