pub mod ast;
pub mod cancel;
pub mod error;
pub mod lexer;
pub mod line_index;
pub mod parser;
pub mod span;

pub use cancel::CancellationToken;
pub use error::Interrupted;
pub use parser::{parse_str, Manifest};
pub use span::Span;
