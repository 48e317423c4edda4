pub mod authorization;
pub mod crud;
pub mod hash;
pub mod jwt;
