use std::fmt::Write;
use std::io;

use serde::Serialize;
use uuid::Uuid;

use crate::models::ContextualMetrics;
use crate::pipeline::Recommendation;

/// Flat row used for CSV and JSON output.
#[derive(Debug, Serialize)]
pub struct RankingRow<'a> {
    pub rank: usize,
    pub agent_id: Uuid,
    pub agent_name: &'a str,
    pub score: f64,
    pub returning_customer: bool,
    pub fallbacks: usize,
}

pub fn ranking_rows(recommendation: &Recommendation, limit: usize) -> Vec<RankingRow<'_>> {
    recommendation
        .ranked
        .iter()
        .take(limit)
        .enumerate()
        .map(|(index, agent)| RankingRow {
            rank: index + 1,
            agent_id: agent.agent_id,
            agent_name: &agent.agent_name,
            score: agent.score,
            returning_customer: agent.returning_customer,
            fallbacks: agent
                .breakdown
                .as_ref()
                .map_or(0, |breakdown| breakdown.fallbacks.len()),
        })
        .collect()
}

pub fn write_csv<W: io::Write>(writer: W, rows: &[RankingRow<'_>]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Plain-text ranking for the terminal.
pub fn build_text(recommendation: &Recommendation, limit: usize) -> String {
    let mut output = String::new();

    if recommendation.ranked.is_empty() {
        let _ = writeln!(output, "No agents available to rank.");
        return output;
    }

    let _ = writeln!(
        output,
        "Top agents for {}:",
        recommendation.inquiry.customer_name
    );
    for row in ranking_rows(recommendation, limit) {
        let note = if row.returning_customer {
            " (returning customer)".to_string()
        } else if row.fallbacks > 0 {
            format!(" ({} of 4 context signals from overall history)", row.fallbacks)
        } else {
            String::new()
        };
        let _ = writeln!(
            output,
            "{}. {} score {:.4}{}",
            row.rank, row.agent_name, row.score, note
        );
    }

    output
}

pub fn build_report(recommendation: &Recommendation, limit: usize) -> String {
    let inquiry = &recommendation.inquiry;
    let mut output = String::new();

    let _ = writeln!(output, "# Agent Recommendation Report");
    let _ = writeln!(
        output,
        "Generated for {} ({} via {}, {} from {})",
        inquiry.customer_name,
        inquiry.lead_source,
        inquiry.communication_method,
        inquiry.destination,
        inquiry.launch_location
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Recommendation");

    match recommendation.top() {
        None => {
            let _ = writeln!(output, "No agents available to rank.");
        }
        Some(top) if top.returning_customer => {
            let _ = writeln!(
                output,
                "- {} (returning customer, last confirmed booking was with this agent)",
                top.agent_name
            );
        }
        Some(top) => {
            let _ = writeln!(output, "- {} with score {:.4}", top.agent_name, top.score);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Ranking");

    if recommendation.ranked.is_empty() {
        let _ = writeln!(output, "No agents available to rank.");
    } else {
        for (index, agent) in recommendation.ranked.iter().take(limit).enumerate() {
            let _ = write!(
                output,
                "{}. {} score {:.4}",
                index + 1,
                agent.agent_name,
                agent.score
            );
            match &agent.breakdown {
                None => {
                    let _ = writeln!(output, " (returning customer override)");
                }
                Some(breakdown) => {
                    let _ = writeln!(output);
                    let _ = writeln!(
                        output,
                        "   - rating {:.4}, conversion {:.4}, revenue {:.4}, tenure {:.4}",
                        breakdown.service_rating,
                        breakdown.conversion,
                        breakdown.revenue,
                        breakdown.tenure
                    );
                    let _ = writeln!(
                        output,
                        "   - contact {:.4}, lead {:.4}, destination {:.4}, launch {:.4}",
                        breakdown.communication,
                        breakdown.lead_source,
                        breakdown.destination,
                        breakdown.launch_location
                    );
                    if !breakdown.fallbacks.is_empty() {
                        let dims: Vec<String> =
                            breakdown.fallbacks.iter().map(|d| d.to_string()).collect();
                        let _ = writeln!(output, "   - fell back to overall history for {}", dims.join(", "));
                    }
                }
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Agent History");

    if recommendation.summaries.is_empty() {
        let _ = writeln!(output, "No agents on record.");
    } else {
        for summary in recommendation.summaries.values() {
            let metrics = recommendation
                .contextual
                .get(&summary.agent_id)
                .copied()
                .unwrap_or_default();
            let _ = writeln!(
                output,
                "- {}: {} assignments, {} confirmed, {} cancelled, {} pending, conversion {:.1}%, avg revenue ${:.0}, {}",
                summary.agent_name,
                summary.total_assignments,
                summary.confirmed_bookings,
                summary.cancelled_bookings,
                summary.pending_bookings,
                summary.conversion_rate * 100.0,
                summary.avg_revenue_per_booking,
                describe_context(&metrics)
            );
        }
    }

    output
}

fn describe_context(metrics: &ContextualMetrics) -> String {
    let rate = |value: Option<f64>| match value {
        Some(value) => format!("{:.0}%", value * 100.0),
        None => "n/a".to_string(),
    };
    let revenue = match metrics.destination_avg_revenue {
        Some(value) => format!("${value:.0}"),
        None => "n/a".to_string(),
    };
    format!(
        "matching contact {}, lead {}, destination {}, launch {}",
        rate(metrics.comm_conversion_rate),
        rate(metrics.lead_conversion_rate),
        revenue,
        rate(metrics.launch_conversion_rate)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringWeights;
    use crate::models::BookingStatus::Confirmed;
    use crate::pipeline;
    use crate::snapshot::fixtures::*;
    use crate::snapshot::Snapshot;

    fn recommendation() -> Recommendation {
        let avery = agent("Avery Lee", 4.5, 8.0);
        let kiara = agent("Kiara Patel", 4.8, 12.0);
        let row = assignment(&kiara, "Phone", "Referral");
        let prior = booking(&row, "Dana Whitfield", Confirmed, 88_000.0, "Bahamas", "Nassau", (2024, 12, 30));
        let snapshot = Snapshot::new(vec![avery, kiara], vec![row], vec![prior]).unwrap();
        pipeline::rank(&snapshot, &inquiry(), &ScoringWeights::default()).unwrap()
    }

    #[test]
    fn report_names_returning_agent_first() {
        let report = build_report(&recommendation(), 10);
        assert!(report.starts_with("# Agent Recommendation Report"));
        assert!(report.contains("- Kiara Patel (returning customer"));
        assert!(report.contains("1. Kiara Patel score 999.0000 (returning customer override)"));
        assert!(report.contains("2. Avery Lee"));
        assert!(report.contains("fell back to overall history for communication method"));
    }

    #[test]
    fn text_output_lists_top_agents() {
        let text = build_text(&recommendation(), 10);
        assert!(text.starts_with("Top agents for Dana Whitfield:"));
        assert!(text.contains("1. Kiara Patel score 999.0000 (returning customer)"));
        assert!(text.contains("2. Avery Lee score"));
    }

    #[test]
    fn zero_limit_does_not_claim_an_empty_ranking() {
        let text = build_text(&recommendation(), 0);
        assert!(!text.contains("No agents available"));
        assert_eq!(text.trim_end(), "Top agents for Dana Whitfield:");
    }

    #[test]
    fn empty_ranking_is_reported() {
        let snapshot = Snapshot::new(Vec::new(), Vec::new(), Vec::new()).unwrap();
        let empty = pipeline::rank(&snapshot, &inquiry(), &ScoringWeights::default()).unwrap();
        assert_eq!(build_text(&empty, 10), "No agents available to rank.\n");
    }

    #[test]
    fn csv_output_has_header_and_rows() {
        let recommendation = recommendation();
        let rows = ranking_rows(&recommendation, 1);
        let mut buffer = Vec::new();
        write_csv(&mut buffer, &rows).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("rank,agent_id,agent_name,score,returning_customer,fallbacks")
        );
        assert!(lines.next().unwrap().contains("Kiara Patel"));
        assert_eq!(lines.next(), None);
    }
}
