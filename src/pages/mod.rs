pub mod settings;
pub mod users;
