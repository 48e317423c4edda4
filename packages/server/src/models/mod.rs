pub mod access;
pub mod annotation;
pub mod auth;
pub mod media;
pub mod shared;
