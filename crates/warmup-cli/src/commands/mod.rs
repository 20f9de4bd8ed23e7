pub mod config;
pub mod open;
pub mod routine;
pub mod widget;
pub mod workout;
