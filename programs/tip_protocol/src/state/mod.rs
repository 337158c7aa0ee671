pub mod tip_record;

pub use tip_record::*;
