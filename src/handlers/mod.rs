pub mod auth;
pub mod dashboard;
pub mod garden;
pub mod health;
pub mod moods;
pub mod relaxation;
pub mod resources;
pub mod sleep;
