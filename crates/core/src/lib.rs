#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod exams;
pub mod model;
pub mod normalize;
pub mod time;

pub use error::CoreError;
pub use time::Clock;
