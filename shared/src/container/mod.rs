mod change_record;
mod manager;
mod state_container;

pub mod error;

pub use change_record::ChangeRecord;
pub use manager::{ContainerManager, FrameKind, OutboundFrame, TickOutput};
pub use state_container::{ChangeObserver, DestroyObserver, StateContainer};
