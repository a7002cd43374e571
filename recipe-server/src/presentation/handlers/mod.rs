pub mod attr;
pub mod recipe;
pub mod user;
