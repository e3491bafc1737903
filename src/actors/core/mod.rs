// ============================================================================
// Core Actor Abstractions
// ============================================================================
//
// The `Actor` contract and the `Group` supervisor that runs actors together.
// Infrastructure actors implement the contract.
//
// ============================================================================

pub mod actor;
pub mod group;

pub use actor::*;
pub use group::*;
