use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use tracing::debug;
use uuid::Uuid;

use crate::config::ScoringWeights;
use crate::models::{
    AgentSummary, ContextDimension, ContextualMetrics, RankedAgent, ScoreBreakdown,
};

/// Combine summaries, contextual metrics and the returning-customer agent into
/// one ranked list, best first.
///
/// The prior agent scores exactly `override_score` and is always ranked first.
/// Everyone else gets the weighted composite, with absent contextual metrics
/// replaced by the agent's global rate or revenue. Ties go to the lower agent id.
pub fn score(
    summaries: &BTreeMap<Uuid, AgentSummary>,
    contextual: &HashMap<Uuid, ContextualMetrics>,
    prior_agent: Option<Uuid>,
    weights: &ScoringWeights,
) -> Vec<RankedAgent> {
    let mut ranked: Vec<RankedAgent> = summaries
        .values()
        .map(|summary| {
            if prior_agent == Some(summary.agent_id) {
                debug!(agent = %summary.agent_name, "returning customer override");
                return RankedAgent {
                    agent_id: summary.agent_id,
                    agent_name: summary.agent_name.clone(),
                    score: weights.override_score,
                    returning_customer: true,
                    breakdown: None,
                };
            }

            let metrics = contextual.get(&summary.agent_id).copied().unwrap_or_default();
            let breakdown = composite(summary, &metrics, weights);
            RankedAgent {
                agent_id: summary.agent_id,
                agent_name: summary.agent_name.clone(),
                score: breakdown.total(),
                returning_customer: false,
                breakdown: Some(breakdown),
            }
        })
        .collect();

    ranked.sort_by(rank_order);
    ranked
}

fn rank_order(a: &RankedAgent, b: &RankedAgent) -> Ordering {
    b.returning_customer
        .cmp(&a.returning_customer)
        .then_with(|| b.score.total_cmp(&a.score))
        .then_with(|| a.agent_id.cmp(&b.agent_id))
}

fn composite(
    summary: &AgentSummary,
    metrics: &ContextualMetrics,
    weights: &ScoringWeights,
) -> ScoreBreakdown {
    let mut fallbacks = Vec::new();
    let mut or_fallback = |value: Option<f64>, fallback: f64, dimension: ContextDimension| {
        value.unwrap_or_else(|| {
            fallbacks.push(dimension);
            fallback
        })
    };

    let conversion = summary.conversion_rate;
    let revenue = summary.avg_revenue_per_booking;
    let comm = or_fallback(
        metrics.comm_conversion_rate,
        conversion,
        ContextDimension::CommunicationMethod,
    );
    let lead = or_fallback(
        metrics.lead_conversion_rate,
        conversion,
        ContextDimension::LeadSource,
    );
    let destination = or_fallback(
        metrics.destination_avg_revenue,
        revenue,
        ContextDimension::Destination,
    );
    let launch = or_fallback(
        metrics.launch_conversion_rate,
        conversion,
        ContextDimension::LaunchLocation,
    );

    ScoreBreakdown {
        service_rating: weights.service_rating_weight * (summary.average_rating / 5.0),
        conversion: weights.conversion_weight * conversion,
        revenue: weights.revenue_weight * (revenue / weights.revenue_norm),
        tenure: weights.tenure_weight * (summary.years_of_service / weights.tenure_norm),
        communication: weights.comm_weight * comm,
        lead_source: weights.lead_weight * lead,
        destination: weights.dest_weight * (destination / weights.revenue_norm),
        launch_location: weights.launch_weight * launch,
        fallbacks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str, rating: f64, years: f64, conversion: f64, revenue: f64) -> AgentSummary {
        AgentSummary {
            agent_id: Uuid::new_v4(),
            agent_name: name.to_string(),
            average_rating: rating,
            years_of_service: years,
            total_assignments: 10,
            confirmed_bookings: 4,
            cancelled_bookings: 0,
            pending_bookings: 0,
            unbooked_assignments: 6,
            conversion_rate: conversion,
            avg_revenue_per_booking: revenue,
        }
    }

    fn by_id(rows: Vec<AgentSummary>) -> BTreeMap<Uuid, AgentSummary> {
        rows.into_iter().map(|row| (row.agent_id, row)).collect()
    }

    #[test]
    fn worked_example_uses_fallbacks() {
        let avery = summary("Avery Lee", 4.5, 8.0, 0.4, 125_000.0);
        let summaries = by_id(vec![avery]);

        let ranked = score(&summaries, &HashMap::new(), None, &ScoringWeights::default());
        assert_eq!(ranked.len(), 1);
        assert!((ranked[0].score - 0.6575).abs() < 1e-9);

        let breakdown = ranked[0].breakdown.as_ref().unwrap();
        assert_eq!(breakdown.fallbacks.len(), 4);
        assert!((breakdown.destination - 0.03125).abs() < 1e-12);
    }

    #[test]
    fn present_zero_is_not_replaced() {
        let avery = summary("Avery Lee", 4.5, 8.0, 0.4, 125_000.0);
        let id = avery.agent_id;
        let summaries = by_id(vec![avery]);
        let contextual = HashMap::from([(
            id,
            ContextualMetrics {
                comm_conversion_rate: Some(0.0),
                lead_conversion_rate: Some(0.0),
                destination_avg_revenue: Some(0.0),
                launch_conversion_rate: Some(0.0),
            },
        )]);

        let ranked = score(&summaries, &contextual, None, &ScoringWeights::default());
        let expected = 0.27 + 0.10 + 0.15625 + 0.04;
        assert!((ranked[0].score - expected).abs() < 1e-9);
        assert!(ranked[0].breakdown.as_ref().unwrap().fallbacks.is_empty());
    }

    #[test]
    fn only_absent_dimensions_fall_back() {
        let avery = summary("Avery Lee", 0.0, 0.0, 0.4, 0.0);
        let id = avery.agent_id;
        let summaries = by_id(vec![avery]);
        let contextual = HashMap::from([(
            id,
            ContextualMetrics {
                comm_conversion_rate: Some(1.0),
                ..ContextualMetrics::default()
            },
        )]);

        let ranked = score(&summaries, &contextual, None, &ScoringWeights::default());
        let breakdown = ranked[0].breakdown.as_ref().unwrap();
        assert_eq!(
            breakdown.fallbacks,
            vec![
                ContextDimension::LeadSource,
                ContextDimension::Destination,
                ContextDimension::LaunchLocation,
            ]
        );
        assert!((breakdown.communication - 0.05).abs() < 1e-12);
        assert!((breakdown.lead_source - 0.02).abs() < 1e-12);
    }

    #[test]
    fn prior_agent_takes_override_and_first_place() {
        let star = summary("Avery Lee", 5.0, 20.0, 1.0, 200_000.0);
        let weak = summary("Jules Moreno", 0.0, 0.0, 0.0, 0.0);
        let weak_id = weak.agent_id;
        let summaries = by_id(vec![star, weak]);

        let ranked = score(&summaries, &HashMap::new(), Some(weak_id), &ScoringWeights::default());
        assert_eq!(ranked[0].agent_id, weak_id);
        assert_eq!(ranked[0].score, 999.0);
        assert!(ranked[0].returning_customer);
        assert!(ranked[0].breakdown.is_none());
    }

    #[test]
    fn override_ranks_first_even_against_huge_revenue() {
        let whale = summary("Avery Lee", 5.0, 20.0, 1.0, 1_000_000_000.0);
        let prior = summary("Jules Moreno", 1.0, 1.0, 0.1, 10.0);
        let prior_id = prior.agent_id;
        let summaries = by_id(vec![whale, prior]);

        let ranked = score(&summaries, &HashMap::new(), Some(prior_id), &ScoringWeights::default());
        assert!(ranked[1].score > ranked[0].score);
        assert_eq!(ranked[0].agent_id, prior_id);
    }

    #[test]
    fn out_of_range_revenue_is_not_clamped() {
        let avery = summary("Avery Lee", 5.0, 20.0, 1.0, 400_000.0);
        let summaries = by_id(vec![avery]);

        let ranked = score(&summaries, &HashMap::new(), None, &ScoringWeights::default());
        assert!(ranked[0].score > 1.0);
    }

    #[test]
    fn sorted_descending_with_id_tiebreak() {
        let mut tied_high = summary("Bea Santos", 4.0, 4.0, 0.5, 50_000.0);
        let mut tied_low = summary("Cal Ortiz", 4.0, 4.0, 0.5, 50_000.0);
        let best = summary("Avery Lee", 5.0, 10.0, 0.9, 150_000.0);
        tied_high.agent_id = Uuid::from_u128(9);
        tied_low.agent_id = Uuid::from_u128(3);
        let best_id = best.agent_id;
        let summaries = by_id(vec![tied_high, tied_low, best]);

        let ranked = score(&summaries, &HashMap::new(), None, &ScoringWeights::default());
        let ids: Vec<_> = ranked.iter().map(|agent| agent.agent_id).collect();
        assert_eq!(ids, vec![best_id, Uuid::from_u128(3), Uuid::from_u128(9)]);
    }

    #[test]
    fn custom_weights_are_applied() {
        let avery = summary("Avery Lee", 5.0, 0.0, 0.0, 0.0);
        let summaries = by_id(vec![avery]);
        let weights = ScoringWeights {
            service_rating_weight: 0.5,
            ..ScoringWeights::default()
        };

        let ranked = score(&summaries, &HashMap::new(), None, &weights);
        assert!((ranked[0].score - 0.5).abs() < 1e-12);
    }
}
