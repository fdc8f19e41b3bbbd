//! Service Layer
//!
//! Record operations shared by the route handlers. Services work in
//! adapter errors; handlers convert them to API errors.

mod table_service;

pub use table_service::*;
