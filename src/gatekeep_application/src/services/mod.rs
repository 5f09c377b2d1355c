pub mod authentication;
pub mod registration;
pub mod session;
