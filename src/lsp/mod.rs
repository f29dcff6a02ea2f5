pub mod backend;
pub mod features;
pub mod models;
pub mod source_fs;
