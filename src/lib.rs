pub mod cache;
pub mod cards;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod generator;
pub mod labels;
pub mod loader;
pub mod scorer;
pub mod session;
pub mod solution;
pub mod spot;
pub mod store;
pub mod strategy;
pub mod villain;
