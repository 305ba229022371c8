//! Concurrency primitives for cooperative pipeline shutdown.

pub mod stop;
