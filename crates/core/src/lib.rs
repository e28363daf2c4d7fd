pub mod code;
pub mod money;
pub mod summary;
pub mod table;

pub use code::{ReportingCode, UnknownCode};
pub use money::Money;
pub use summary::AggregateRow;
pub use table::{Cell, SchemaError, Table};
