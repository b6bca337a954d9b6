pub mod maths_utils;
pub mod synthetic;
pub mod time_utils;

pub use time_utils::TimeUtils;
