pub mod access;
pub mod annotation;
pub mod health;
pub mod login;
pub mod media;
