//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects carry no identity and are compared by their attributes.
/// A price of `9.99` is equal to any other price of `9.99`; a product with
/// id `7` is the same product whatever its current price.
///
/// Construction is where invariants are checked (e.g. a price is never
/// negative), so holders of a value object can rely on it without revalidating.
///
/// ```ignore
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
/// struct Price(Decimal);
///
/// impl ValueObject for Price {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
