//! Frame loop
//!
//! Change detection over the drag set and the scheduler that decides, once
//! per render tick, whether connectors are rebuilt.
//!
//! ```text
//! tick
//!   ├─ node update callbacks, port clamping
//!   ├─ FrameSnapshot::capture (drag set + direct children)
//!   ├─ positions changed | DRAWING | RESCALED, and interactive view
//!   │     └─ rebuild every connector relating > 1 object
//!   └─ rotations changed
//!         └─ persist class/port rotations
//! ```

mod change_detector;
mod scheduler;

pub use change_detector::{approximately_equal, approximately_equal_within, FrameSnapshot};
pub use scheduler::{FrameScheduler, TickReport, TickState};
