//! Rule #1 "10 Pillars" evaluation over annual statements and a quote
//! snapshot, plus the valuation and peer-health figures shown next to it.

pub mod engine;
pub mod format;
pub mod health;
pub mod labels;
pub mod period;
pub mod pillars;
pub mod resolver;
pub mod valuation;


pub use engine::*;
pub use format::*;
pub use health::*;
pub use labels::*;
pub use period::*;
pub use pillars::*;
pub use resolver::*;
pub use valuation::*;
