//! Built-in rule families.

pub mod datetime;
pub mod identity;
pub mod namespace;
pub mod syntax;

pub use datetime::DateTimeFormat;
pub use identity::UniqueIdentity;
pub use namespace::RequiredNamespace;
pub use syntax::DisplayIdSyntax;
