pub mod diagnostic;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod pipeline;
pub mod string;
pub mod value;
