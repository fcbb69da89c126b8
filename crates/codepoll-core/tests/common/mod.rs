#![allow(dead_code)]

pub mod codes_server;
