pub mod hits;
pub mod identity;
pub mod pool;
pub mod thresholds;
