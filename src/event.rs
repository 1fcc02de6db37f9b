use crate::input::UiCommand;
use crate::stream_client::StreamEvent;

/// Inputs to the controller. Each one is processed to completion before the
/// next is taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    Stream(StreamEvent),
    /// Fixed-cadence prediction timer fired.
    PredictionDue,
    /// 1 s display timer fired.
    CountdownTick,
    Command(UiCommand),
}
