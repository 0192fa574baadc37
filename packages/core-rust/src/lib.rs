//! Rowstash Core — row model, value types, storage events, and clock.

pub mod clock;
pub mod event;
pub mod row;
pub mod types;

pub use clock::{ClockSource, ManualClock, SystemClock};
pub use event::StorageEvent;
pub use row::{Row, RowOptions, RowSet};
pub use types::Value;
