//! Services Layer
//!
//! Page assembly on top of the repositories. Handlers call these and only
//! deal with HTTP concerns (cookies, status codes).

pub mod blog_service;
pub mod catalog_service;
pub mod media;
pub mod showcase;
