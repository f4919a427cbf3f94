pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod paginator;
pub mod prismic;
pub mod reading_time;
pub mod render;
pub mod richtext;
