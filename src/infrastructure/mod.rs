pub mod attachments;
pub mod backends;
