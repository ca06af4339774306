// VIEW: Diagnostics readout for the debug display
pub mod debug_panel;

pub use debug_panel::DebugReadout;
