pub mod epub;
pub mod image_server;
