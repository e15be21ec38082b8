//! Observable containers.
//!
//! Provides:
//! - `ObservableMapping` - string-keyed mapping that notifies on mutation
//! - `ObservableSequence` - ordered sequence that notifies on mutation
//! - `Container` / `ChangeHandler` - the wiring that bubbles nested changes
//!   up to the outermost container

mod mapping;
mod sequence;
mod wiring;

pub use mapping::ObservableMapping;
pub use sequence::ObservableSequence;
pub use wiring::{ChangeHandler, Container, noop_handler};

pub(crate) use wiring::wrap;
