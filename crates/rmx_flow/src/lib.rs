pub mod runner;
pub mod state;

pub use runner::ProcessRunner;
pub use state::{advance, FlowOutput, ProcessEvent, ProcessState};

pub mod prelude {
    pub use super::{advance, FlowOutput, ProcessEvent, ProcessRunner, ProcessState};
    pub use rmx_core::{Result, Style};
}
