use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info};
use uuid::Uuid;

use crate::combiner;
use crate::config::ScoringWeights;
use crate::contextual;
use crate::error::Result;
use crate::models::{AgentSummary, ContextualMetrics, Inquiry, RankedAgent};
use crate::returning;
use crate::snapshot::Snapshot;
use crate::summary;

/// Everything derived for one inquiry. Recomputed per request, never stored.
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub inquiry: Inquiry,
    pub prior_agent: Option<Uuid>,
    pub summaries: BTreeMap<Uuid, AgentSummary>,
    pub contextual: HashMap<Uuid, ContextualMetrics>,
    pub ranked: Vec<RankedAgent>,
}

impl Recommendation {
    pub fn top(&self) -> Option<&RankedAgent> {
        self.ranked.first()
    }
}

/// Rank every agent in the snapshot for a single inquiry.
pub fn rank(
    snapshot: &Snapshot,
    inquiry: &Inquiry,
    weights: &ScoringWeights,
) -> Result<Recommendation> {
    inquiry.validate()?;
    weights.validate()?;

    let summaries = summary::summarize(snapshot);
    let contextual = contextual::contextualize(snapshot, inquiry);
    let prior_agent = returning::resolve_prior_agent(snapshot, &inquiry.customer_name);
    debug!(
        agents = summaries.len(),
        with_context = contextual.len(),
        returning = prior_agent.is_some(),
        "derived views ready"
    );

    let ranked = combiner::score(&summaries, &contextual, prior_agent, weights);
    if let Some(top) = ranked.first() {
        info!(
            customer = %inquiry.customer_name,
            agent = %top.agent_name,
            score = top.score,
            "recommended agent"
        );
    }

    Ok(Recommendation {
        inquiry: inquiry.clone(),
        prior_agent,
        summaries,
        contextual,
        ranked,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RankError;
    use crate::models::BookingStatus::{Cancelled, Confirmed};
    use crate::snapshot::fixtures::*;

    fn scenario() -> Snapshot {
        let avery = agent("Avery Lee", 4.5, 8.0);
        let jules = agent("Jules Moreno", 3.5, 2.0);
        let mut assignments = Vec::new();
        let mut bookings = Vec::new();

        for i in 0..10 {
            let row = assignment(&avery, "Email", "Web");
            if i < 4 {
                let revenue = [100_000.0, 150_000.0, 200_000.0, 50_000.0][i];
                bookings.push(booking(&row, "Other", Confirmed, revenue, "Greece", "Athens", (2024, 1, 1)));
            }
            assignments.push(row);
        }

        let phone = assignment(&jules, "Phone", "Referral");
        bookings.push(booking(
            &phone,
            "Dana Whitfield",
            Cancelled,
            0.0,
            "Bahamas",
            "Fort Lauderdale",
            (2025, 3, 1),
        ));
        assignments.push(phone);

        Snapshot::new(vec![avery, jules], assignments, bookings).unwrap()
    }

    #[test]
    fn ranks_worked_example_first() {
        let snapshot = scenario();
        let recommendation = rank(&snapshot, &inquiry(), &ScoringWeights::default()).unwrap();

        assert_eq!(recommendation.ranked.len(), 2);
        let top = recommendation.top().unwrap();
        assert_eq!(top.agent_name, "Avery Lee");
        assert!((top.score - 0.6575).abs() < 1e-9);
        assert_eq!(recommendation.prior_agent, None);
    }

    #[test]
    fn invalid_inquiry_fails_before_scoring() {
        let snapshot = scenario();
        let mut inquiry = inquiry();
        inquiry.lead_source.clear();

        let err = rank(&snapshot, &inquiry, &ScoringWeights::default()).unwrap_err();
        assert!(matches!(err, RankError::InvalidInquiry(_)));
    }

    #[test]
    fn invalid_weights_are_rejected() {
        let snapshot = scenario();
        let weights = ScoringWeights {
            revenue_norm: 0.0,
            ..ScoringWeights::default()
        };

        let err = rank(&snapshot, &inquiry(), &weights).unwrap_err();
        assert!(matches!(err, RankError::InvalidConfig(_)));
    }

    #[test]
    fn rerunning_is_idempotent() {
        let snapshot = scenario();
        let first = rank(&snapshot, &inquiry(), &ScoringWeights::default()).unwrap();
        let second = rank(&snapshot, &inquiry(), &ScoringWeights::default()).unwrap();

        let pairs = |rec: &Recommendation| -> Vec<(Uuid, f64)> {
            rec.ranked.iter().map(|agent| (agent.agent_id, agent.score)).collect()
        };
        assert_eq!(pairs(&first), pairs(&second));
    }
}
