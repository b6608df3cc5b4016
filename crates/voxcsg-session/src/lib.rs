pub mod channel;
pub mod command;
pub mod config;
pub mod controller;
pub mod render;

pub use command::{parse_command, Command, CommandError};
pub use config::SessionConfig;
pub use controller::{SessionController, SessionError, ShutdownSignal};
pub use render::FrameForwarder;
