//! Products domain module.
//!
//! This crate contains the catalog model and the filter resolver that turns
//! raw search parameters into a validated predicate. It is pure domain logic
//! (no IO, no HTTP, no storage).

pub mod filter;
pub mod product;

pub use filter::{FilterResolver, Page, PriceRange, ProductFilter, SearchParams, DEFAULT_MAX_PAGE_SIZE};
pub use product::{Category, Price, Product};
