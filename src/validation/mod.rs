//! Structural validation of submitted funnels.
//!
//! Every rule runs before a `FunnelGraph` exists, so propagation and
//! aggregation can assume a well-formed graph and never fail for structural
//! reasons.

pub use self::error::{ValidationError, ValidationErrorKind};
pub use self::validator::{diagnose, Validator};

mod error;
mod validator;
mod rules {
    pub mod acyclic;
    pub mod edges;
    pub mod nodes;
}
