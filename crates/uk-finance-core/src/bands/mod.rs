pub mod schedule;
pub mod schedules;

pub use schedule::{apply, Band, BandBreakdown, BandSlice, BandedSchedule};
