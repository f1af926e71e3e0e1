// Domain layer: station records, reports and ports. No I/O happens here.

pub mod model;
pub mod ports;
