pub type ProductId = String;
pub type BidderId = String;

/// Monetary amount in minor currency units (e.g. cents). Money never goes
/// through floating point.
pub type Amount = u64;
