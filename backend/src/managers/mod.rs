//! Managers coordinating the two halves of the network
//!
//! - **production**: sources, arrival generation, admission/rejection
//! - **selection**: processors, dispatch, completion
//!
//! Neither manager stores the buffer; the simulator owns it and lends it to
//! whichever side needs it for a given operation.

pub mod production;
pub mod selection;

pub use production::ProductionManager;
pub use selection::{Completion, SelectionManager};
