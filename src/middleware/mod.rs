pub mod origin;

pub use origin::origin_guard_middleware;
