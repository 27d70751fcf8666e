pub mod error;
pub mod family_member_service;
pub mod todo_service;
