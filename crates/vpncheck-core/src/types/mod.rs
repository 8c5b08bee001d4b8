mod ipapi;
mod report;

pub use ipapi::*;
pub use report::*;
