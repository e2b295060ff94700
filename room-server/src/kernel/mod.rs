pub mod entities;
pub mod store;

#[cfg(test)]
pub mod test_utils {
    // Default product id
    pub const DEFAULT_PRODUCT_ID: &str = "vintage-clock";
}
