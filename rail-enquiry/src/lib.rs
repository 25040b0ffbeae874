//! Railway enquiry client.
//!
//! Answers the questions the Indian Railways enquiry site answers: trains
//! between stations, seat availability, fares, schedules, PNR status and
//! live running status. Queries are gated by an arithmetic captcha, which
//! is solved with OCR.

pub mod captcha;
pub mod domain;
pub mod enquiry;
pub mod live;
pub mod reference;
pub mod table;
