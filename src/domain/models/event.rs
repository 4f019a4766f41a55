use tui_textarea::Input;

use super::GenerationOutcome;

pub enum Event {
    BackendHealth(Result<(), String>),
    GenerationProgress(f64),
    GenerationSettling(),
    GenerationSettled(GenerationOutcome),
    KeyboardBackTab(),
    KeyboardCharInput(Input),
    KeyboardCTRLC(),
    KeyboardEnter(),
    KeyboardPaste(String),
    KeyboardTab(),
    UIResize(),
    UIScrollDown(),
    UIScrollPageDown(),
    UIScrollPageUp(),
    UIScrollUp(),
    UITick(),
}
