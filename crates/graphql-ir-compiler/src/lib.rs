#![doc = include_str!("../README.md")]

pub mod ast;
pub mod condition;
pub mod diagnostic;
pub mod executable;
pub mod ir;
mod name;
mod node;
pub mod parser;
pub mod schema;
pub mod validation;

pub use self::condition::BooleanExpression;
pub use self::diagnostic::CompileResult;
pub use self::diagnostic::DiagnosticList;
pub use self::executable::ExecutableDocument;
pub use self::name::InvalidNameError;
pub use self::name::Name;
pub use self::node::FileId;
pub use self::node::Node;
pub use self::node::NodeLocation;
pub use self::parser::parse_ast;
pub use self::parser::Parser;
pub use self::parser::SourceFile;
pub use self::parser::SourceMap;
pub use self::schema::Schema;
pub use self::schema::SchemaBuilder;
pub use self::validation::Valid;
