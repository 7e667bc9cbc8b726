//! Engine operations, one file per component.
//!
//! Every file adds an `impl TribunalService` block. Reads return entities or
//! views from `trb-core`; mutations follow the protocol described on
//! [`crate::service::TribunalService`].

pub mod aggregator;
pub mod appeal;
pub mod audit;
pub mod catalog;
pub mod distribution;
pub mod judgment_session;
pub mod ledger;
pub mod member;
pub mod resolver;
pub mod status;
