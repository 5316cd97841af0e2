pub mod course;
pub mod timetable;

pub use course::*;
pub use timetable::*;
