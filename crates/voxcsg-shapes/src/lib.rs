pub mod expr;
pub mod interpreter;
pub mod library;
pub mod loader;
pub mod migration;
pub mod validator;

pub use expr::{Expr, ExprError};
pub use interpreter::{AppliedOperation, DrawReport, Interpreter, ShapeError};
pub use library::{ShapeLibrary, ShapeSource};
pub use loader::LoadError;
