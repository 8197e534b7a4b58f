// Domain layer: models, ports and record conversions. No I/O here.

pub mod model;
pub mod ports;
pub mod services;
