//! Host controller
//!
//! [`AppContext`] owns everything one toy needs (module handle, loop state,
//! surface, input bridge, diagnostics) and is the only thing the frame
//! pacer, the input handlers and the load continuation talk to.

mod context;
mod diagnostics;
mod reset;


pub use context::AppContext;
pub use diagnostics::{Diagnostic, Diagnostics, Level};
pub use reset::ResetAction;
