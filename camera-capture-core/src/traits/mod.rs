pub mod camera_delegate;
pub mod camera_provider;
pub mod capture_backend;
