pub mod coordinator;
pub mod recording;
