pub mod chat;
pub mod evaluation;
pub mod profile;
