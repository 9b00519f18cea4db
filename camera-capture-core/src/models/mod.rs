pub mod camera_models;
pub mod config;
pub mod error;
pub mod frame;
pub mod recording_info;
pub mod state;
