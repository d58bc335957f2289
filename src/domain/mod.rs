// Domain layer: typed values, entities and the ports the core logic talks to.

pub mod model;
pub mod ports;
