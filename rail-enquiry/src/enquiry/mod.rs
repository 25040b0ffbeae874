//! Enquiries against the railway enquiry site.
//!
//! [`EnquiryClient`] owns the captcha session and sends each enquiry type
//! to the unified endpoint. List results come back as [`Records`], which
//! can be tabulated under the columns declared for their page or
//! deserialized into the typed views in [`types`].
//!
//! [`Records`]: crate::table::Records

mod available;
mod client;
mod config;
mod error;
mod page;
mod session;
pub mod types;

pub use available::AvailableOption;
pub use client::{EnquiryClient, ResolvedDefaults};
pub use config::{DEFAULT_BASE_URL, DEFAULT_LIVE_BASE_URL, EnquiryConfig, QueryDefaults};
pub use error::EnquiryError;
pub use page::{
    EnquiryPage, FARE_COLUMNS, SCHEDULE_COLUMNS, SEAT_AVAILABILITY_COLUMNS,
    SESSION_EXPIRED_MESSAGE, TRAINS_BETWEEN_COLUMNS,
};
pub use session::Session;
pub use types::{AvailabilityDay, FareBreakdown, JourneyQuery, TrainSummary};
