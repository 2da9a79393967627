pub mod server;

pub mod error;
pub mod config;
pub mod logging;
pub mod bootstrap;

pub mod vocabulary;
pub mod command;
pub mod inventory;
pub mod prompt;
pub mod llm;
pub mod resolver;
pub mod platform;
pub mod dispatcher;
pub mod speech;
pub mod pipeline;
pub mod session;

mod utils;

pub use crate::command::{Command, CommandDescriptor};
pub use crate::config::GatewayConfig;
pub use crate::dispatcher::Dispatcher;
pub use crate::error::{GatewayError, GatewayResult};
pub use crate::inventory::{ApplicationEntry, ApplicationInventory};
pub use crate::pipeline::Pipeline;
pub use crate::resolver::Resolver;
pub use crate::server::Server;
