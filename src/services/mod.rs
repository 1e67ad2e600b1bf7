pub mod aggregate;
pub mod garden;
pub mod history;
pub mod recorder;
pub mod relaxation;
pub mod resources;
pub mod revision;
