#![cfg(test)]

pub mod common;
pub mod config_tests;
pub mod override_tests;
