pub mod posters;
pub mod settings;
pub mod upload;
