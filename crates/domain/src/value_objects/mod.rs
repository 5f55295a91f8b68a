pub mod price;
pub mod price_range;

pub use price::Price;
pub use price_range::PriceRange;
