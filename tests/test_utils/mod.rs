#![allow(dead_code, unused_imports)]

pub mod fixtures;

pub use fixtures::{CollectingHook, FailingFormatter, memory_producer, plain_options};
