// Domain layer: port names, payload types and the collaborator traits the bridge consumes.

pub mod model;
pub mod ports;
