//! Operation (signpost) tracking.
//!
//! # Data Flow
//! ```text
//! Operation::begin / event / end
//!     → lifecycle.rs (state transition, correlation id)
//!     → DriverRegistry::dispatch (debug record + Signpost)
//!     → observer.rs (OperationUpdate, after drivers)
//! ```

pub mod lifecycle;
pub mod observer;

pub use lifecycle::{MisusePolicy, Operation, OperationState};
pub use observer::{OperationObserver, OperationUpdate};
