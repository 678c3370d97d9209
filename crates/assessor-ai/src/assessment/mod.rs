//! Assessment domain: the property record model and the pure validation and valuation
//! engines that agents wrap.

pub mod import;
pub mod property;
pub mod validation;
pub mod valuation;

#[cfg(test)]
pub(crate) mod fixtures;

pub use property::{Coerced, FieldValue, FlagValue, PropertyClass, PropertyRecord};
pub use validation::{validate, validate_batch, BatchValidation, ValidationResult, ValidationRules};
pub use valuation::{PricingTables, ValuationApproach, ValuationError, ValuationResult};
