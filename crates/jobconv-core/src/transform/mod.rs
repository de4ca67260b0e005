//! Field transformation rules
//!
//! - [`rule`] - the closed [`Rule`] type compiled from directive text
//! - [`built_in`] - value functions behind the simple rules
//! - [`dispatcher`] - [`RuleDispatcher`], which applies a rule to a value
//!
//! ```
//! use jobconv_core::record::FieldValue;
//! use jobconv_core::transform::{apply_static, Rule};
//!
//! let rule = Rule::parse("採用人数を抽出");
//! assert_eq!(apply_static(FieldValue::Present("3名急募"), &rule), "3名");
//! ```

pub mod built_in;
pub mod dispatcher;
pub mod rule;

#[cfg(test)]
mod tests;

pub use dispatcher::{apply_static, RuleDispatcher};
pub use rule::{Attribute, ClassifyTarget, Normalization, Rule};
