pub mod image_host;
