pub mod context;
pub mod environment;
mod tree;

pub use tree::{TreeWalkInterpreter, TreeWalkStatementInterpreter};
