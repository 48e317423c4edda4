pub mod access;
pub mod annotation;
pub mod media;
