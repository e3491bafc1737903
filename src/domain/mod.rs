// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Lookup data and the rules for querying it. Nothing here knows about
// actors, HTTP or gRPC.
//
// ============================================================================

pub mod names;
