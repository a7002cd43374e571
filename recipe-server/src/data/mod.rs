pub mod attr_repository;
pub mod recipe_repository;
pub mod user_repository;

#[cfg(test)]
pub mod memory;
