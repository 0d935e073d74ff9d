//! Shopping services built on the platform client.

pub mod navigation;
pub mod pricing;
pub mod wishlist;
