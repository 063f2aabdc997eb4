pub mod health;
pub mod upload_video;
