// Domain layer: statement records and ports (interfaces) the pipeline is built against.

pub mod model;
pub mod ports;
