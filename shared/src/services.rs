pub mod cognito_service;
pub mod dynamodb_service;
pub mod guestbook_service;
pub mod locked_section_service;
pub mod memory_service;
pub mod notes_service;

pub use cognito_service::*;
pub use dynamodb_service::*;
pub use guestbook_service::*;
pub use locked_section_service::*;
pub use memory_service::*;
pub use notes_service::*;

