// Adapters layer: concrete clients for external systems the pipeline reads from.

pub mod http;
