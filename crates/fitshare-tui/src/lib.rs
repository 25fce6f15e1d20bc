pub mod app;
pub mod card;
pub mod components;
pub mod config;
pub mod quick_post;
pub mod state;
pub mod sync;
pub mod wizard;
