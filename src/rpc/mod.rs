// ============================================================================
// RPC Module - names.v1.AppServer over gRPC (tonic)
// ============================================================================
//
// - proto:    wire messages, server trait, server and client
// - service:  lookup handlers backed by the names table
// - server:   listener running the service with grpc health
// - outbound: client side used by the interactive input actor
//
// ============================================================================

pub mod proto;
mod outbound;
mod server;
mod service;

pub use outbound::RpcOutbound;
pub use server::GrpcListener;
pub use service::{NamesRpc, REQUEST_ID_HEADER};
