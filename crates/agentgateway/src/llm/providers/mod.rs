//! Per-backend connection config and path/host construction (spec §4.1, §6).
//! Each `Provider` impl knows how to turn a canonical request's model name
//! into the concrete host and HTTP path its backend expects; the streaming
//! vs. unary distinction is a plain `bool` since every backend in scope has
//! exactly one route for each.

pub mod azure;
pub mod bedrock;
pub mod openai;
pub mod vertex;

pub trait Provider {
	const NAME: agent_core::strng::Strng;
}
