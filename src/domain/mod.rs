// Domain layer: immutable value records and the async ports the resolvers depend on.

pub mod model;
pub mod ports;
