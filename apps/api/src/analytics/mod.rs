pub mod clock;
pub mod composite;
pub mod execution;
pub mod funnel;
pub mod handlers;
pub mod lanes;
pub mod math;
pub mod projection;
pub mod signals;

#[cfg(test)]
pub mod test_support;
