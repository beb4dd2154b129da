//! Test utilities for the marko compiler.

pub mod compile;

pub use compile::{
    compile, compile_at, test_config, CountingObserver,
};
