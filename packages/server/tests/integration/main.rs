mod access;
mod authorization;
mod login;
mod media;
mod upload;
