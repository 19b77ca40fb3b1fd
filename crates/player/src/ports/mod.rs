//! Ports - traits at the boundary between the controllers and the transport.

pub mod outbound;
