pub mod support;

pub mod resolver_tests;
