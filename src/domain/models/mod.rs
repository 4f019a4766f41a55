mod action;
mod backend;
mod clipboard;
mod error;
mod event;
mod form;
mod generation;
mod notification;
mod request;
mod response;
mod store;
mod view;

pub use action::*;
pub use backend::*;
pub use clipboard::*;
pub use error::*;
pub use event::*;
pub use form::*;
pub use generation::*;
pub use notification::*;
pub use request::*;
pub use response::*;
pub use store::*;
pub use view::*;
