pub mod keywords;
pub mod types;

pub use keywords::{tokenize, Bucket, GenericApp};
pub use types::{Command, CommandDescriptor, OPEN_VALIDATION_ERROR};
