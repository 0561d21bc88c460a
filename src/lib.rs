//! Ranks service agents for a new customer inquiry from their booking history.
//!
//! The pipeline is a set of pure functions over an immutable [`Snapshot`]:
//! [`summary::summarize`], [`contextual::contextualize`],
//! [`returning::resolve_prior_agent`] and [`combiner::score`], wired together
//! by [`pipeline::rank`].

pub mod combiner;
pub mod config;
pub mod contextual;
pub mod db;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod returning;
pub mod snapshot;
pub mod summary;

pub use config::ScoringWeights;
pub use error::RankError;
pub use models::{Inquiry, RankedAgent};
pub use pipeline::{rank, Recommendation};
pub use snapshot::Snapshot;
