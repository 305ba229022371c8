pub mod action;
pub mod concurrency;
pub mod error;
pub mod event;
mod macros;
pub mod pipeline;
pub mod source;
pub mod supervisor;
pub mod transform;
pub mod worker;
