// Domain layer: order/review records, report shapes, and the ports the reporter reads through.

pub mod model;
pub mod ports;
