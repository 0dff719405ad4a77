// Domain layer: table model and ports. Nothing here touches files or formats.

pub mod model;
pub mod ports;
