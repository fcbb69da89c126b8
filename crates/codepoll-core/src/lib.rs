pub mod config;
pub mod logging;

pub mod controller;
pub mod countdown;
pub mod fetch;
pub mod model;
pub mod page;
pub mod render;
pub mod retry;
pub mod source;
pub mod timer;
