pub mod family_member;
pub mod repository;
pub mod seed;
pub mod todo;
