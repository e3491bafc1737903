// ============================================================================
// Names Domain - Year-Partitioned Name Lookup
// ============================================================================
//
// This module contains ALL name lookup code:
// - Value objects (NameRecord, Page)
// - Errors (NamesError, QueryError)
// - Table (NamesTable, built once at startup)
// - Queries (parameter defaults and validation shared by HTTP and gRPC)
// - Transform (raw name list -> dataset layout)
//
// ============================================================================

mod csv;
pub mod errors;
pub mod query;
pub mod table;
pub mod transform;
pub mod value_objects;

pub use errors::*;
pub use query::*;
pub use table::*;
pub use transform::*;
pub use value_objects::*;
