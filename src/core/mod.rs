pub mod draft;
pub mod roster;
pub mod user;
pub mod view_model;
