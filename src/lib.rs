pub mod activity;
pub mod client;
pub mod config;
pub mod defi;
pub mod fetcher;
pub mod formatters;
pub mod models;
pub mod nft;
pub mod persona;
pub mod registry;
pub mod rewind;
pub mod summary;
pub mod tokens;
pub mod window;
