//! Drywall phase scheduling: phases, qualifying-day rules, and the generator.

pub mod calendar;
pub mod generator;
pub mod phase;

pub use calendar::{
    DISPLAY_FORMAT, DateParseError, SkipRule, advance_qualifying_days, parse_date,
};
pub use generator::{MudOrder, Schedule, ScheduleEntry, ScheduleError, build_schedule, order_mud};
pub use phase::{Phase, PhaseParseError};
