//! Game server socket: wire types and the client transport

pub mod protocol;
pub mod transport;

pub use transport::{ConnectionState, Transport};
