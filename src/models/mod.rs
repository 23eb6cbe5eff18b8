//! Data models for the Biblio server

pub mod book;
pub mod history;
pub mod user;
