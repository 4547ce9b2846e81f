mod attachment;
mod backend;
mod bubble;
mod event;
mod message;
mod role;
mod slash_commands;
mod textarea;

pub use attachment::*;
pub use backend::*;
pub use bubble::*;
pub use event::*;
pub use message::*;
pub use role::*;
pub use slash_commands::*;
pub use textarea::*;
