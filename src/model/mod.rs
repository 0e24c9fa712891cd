pub mod entity;
pub mod profile;
pub mod result;
pub mod score;
