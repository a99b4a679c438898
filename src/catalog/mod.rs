//! Query catalog: modes, tables and their fixed query templates
//!
//! No SQL is ever assembled from user input; the closed [`SearchMode`] set
//! maps onto static templates and values are bound as parameters.

pub mod modes;
pub mod tables;
pub mod templates;

pub use modes::{FieldShape, FilterField, SearchMode};
pub use tables::{Catalog, TableRef};
pub use templates::{complement_for, template_for, Binding, QueryTemplate};
