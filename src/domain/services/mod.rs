mod app_state;
mod attachment_staging;
mod bubble_list;
pub mod clipboard;
pub mod events;
mod export;
mod message_log;
mod scroll;
mod session_controller;

pub use app_state::*;
pub use attachment_staging::*;
pub use bubble_list::*;
pub use export::*;
pub use message_log::*;
pub use scroll::*;
pub use session_controller::*;
