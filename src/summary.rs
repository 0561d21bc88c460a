use std::collections::BTreeMap;

use uuid::Uuid;

use crate::models::{AgentSummary, BookingStatus};
use crate::snapshot::Snapshot;

#[derive(Default)]
struct Tally {
    total: usize,
    confirmed: usize,
    cancelled: usize,
    pending: usize,
    unbooked: usize,
    confirmed_revenue: f64,
}

/// Aggregate each agent's history into one summary row. Agents without any
/// assignments still get a row, with every derived metric at zero.
pub fn summarize(snapshot: &Snapshot) -> BTreeMap<Uuid, AgentSummary> {
    let mut tallies: BTreeMap<Uuid, Tally> = snapshot
        .agents()
        .iter()
        .map(|agent| (agent.id, Tally::default()))
        .collect();

    for row in snapshot.history() {
        let tally = tallies.entry(row.assignment.agent_id).or_default();
        tally.total += 1;

        match row.booking {
            None => tally.unbooked += 1,
            Some(booking) => match booking.status {
                BookingStatus::Confirmed => {
                    tally.confirmed += 1;
                    tally.confirmed_revenue += booking.total_revenue.unwrap_or(0.0);
                }
                BookingStatus::Cancelled => tally.cancelled += 1,
                BookingStatus::Pending => tally.pending += 1,
                BookingStatus::Other(_) => {}
            },
        }
    }

    snapshot
        .agents()
        .iter()
        .map(|agent| {
            let tally = tallies.remove(&agent.id).unwrap_or_default();
            let summary = AgentSummary {
                agent_id: agent.id,
                agent_name: agent.name.clone(),
                average_rating: agent.average_rating.unwrap_or(0.0),
                years_of_service: agent.years_of_service.unwrap_or(0.0),
                total_assignments: tally.total,
                confirmed_bookings: tally.confirmed,
                cancelled_bookings: tally.cancelled,
                pending_bookings: tally.pending,
                unbooked_assignments: tally.unbooked,
                conversion_rate: ratio(tally.confirmed as f64, tally.total),
                avg_revenue_per_booking: ratio(tally.confirmed_revenue, tally.confirmed),
            };
            (agent.id, summary)
        })
        .collect()
}

fn ratio(numerator: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        numerator / count as f64
    }
}
