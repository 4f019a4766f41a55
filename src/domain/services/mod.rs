pub mod actions;
pub mod clipboard;
mod controller;
mod credentials;
mod endpoint;
pub mod events;
mod fallback;
mod output;
mod progress;
pub mod samples;
mod scroll;
mod syntaxes;

pub use controller::*;
pub use credentials::*;
pub use endpoint::*;
pub use fallback::*;
pub use output::*;
pub use progress::*;
pub use scroll::*;
pub use syntaxes::*;
