//! Access control — the ADMIN and OPERATOR roles and the membership table
//! every mutating entry point consults.

pub mod controller;
pub mod role;

pub use controller::AccessController;
pub use role::Role;
