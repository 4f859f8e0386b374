// Domain layer: data model and the collaborator ports the provisioning core depends on.

pub mod model;
pub mod ports;
