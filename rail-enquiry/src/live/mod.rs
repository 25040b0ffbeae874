//! Live running status.
//!
//! The live status endpoint answers with script-embedded, JavaScript-like
//! literals rather than JSON. `lexer` and `parser` implement a small
//! grammar for them; `status` shapes the result.

mod error;
mod lexer;
mod parser;
mod status;

pub use error::LiveParseError;
pub use parser::{parse_embedded, parse_value};
pub use status::{LiveStatus, RAKE_COLUMNS, STATION_COLUMNS};
