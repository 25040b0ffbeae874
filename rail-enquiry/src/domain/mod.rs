//! Domain types for railway enquiries.
//!
//! All types enforce their invariants at construction time, so code that
//! receives them can trust their validity.

mod class;
mod date;
mod pnr;
mod quota;
mod station;
mod train;

pub use class::{InvalidTravelClass, TravelClass};
pub use date::{InvalidJourneyDate, format_journey_date, parse_journey_date};
pub use pnr::{InvalidPnr, Pnr};
pub use quota::{Quota, UnknownQuota, quota_choices};
pub use station::{InvalidStationCode, StationCode};
pub use train::{InvalidTrainNumber, TrainNumber};
