use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{ContextualMetrics, Inquiry};
use crate::snapshot::{HistoryRow, Snapshot};

/// Running mean keyed by agent.
#[derive(Default, Clone, Copy)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn value(self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Per-agent metrics restricted to history matching each inquiry attribute.
/// Agents missing from the map have no matching history in any dimension.
pub fn contextualize(snapshot: &Snapshot, inquiry: &Inquiry) -> HashMap<Uuid, ContextualMetrics> {
    let comm = conversion_where(snapshot, |row| {
        row.assignment.communication_method == inquiry.communication_method
    });
    let lead = conversion_where(snapshot, |row| {
        row.assignment.lead_source == inquiry.lead_source
    });
    let destination = destination_revenue(snapshot, &inquiry.destination);
    let launch = conversion_where(snapshot, |row| {
        row.booking
            .is_some_and(|booking| booking.launch_location == inquiry.launch_location)
    });

    let mut metrics: HashMap<Uuid, ContextualMetrics> = HashMap::new();
    for (agent_id, rate) in comm {
        metrics.entry(agent_id).or_default().comm_conversion_rate = Some(rate);
    }
    for (agent_id, rate) in lead {
        metrics.entry(agent_id).or_default().lead_conversion_rate = Some(rate);
    }
    for (agent_id, revenue) in destination {
        metrics.entry(agent_id).or_default().destination_avg_revenue = Some(revenue);
    }
    for (agent_id, rate) in launch {
        metrics.entry(agent_id).or_default().launch_conversion_rate = Some(rate);
    }
    metrics
}

/// Share of matching rows that ended in a confirmed booking, per agent.
fn conversion_where<F>(snapshot: &Snapshot, matches: F) -> HashMap<Uuid, f64>
where
    F: Fn(&HistoryRow<'_>) -> bool,
{
    let mut means: HashMap<Uuid, Mean> = HashMap::new();
    for row in snapshot.history().filter(|row| matches(row)) {
        let hit = if row.is_confirmed() { 1.0 } else { 0.0 };
        means.entry(row.assignment.agent_id).or_default().push(hit);
    }
    collapse(means)
}

/// Mean confirmed revenue for bookings to `destination`. Unconfirmed bookings
/// contribute nothing, so an agent with only cancellations there is absent.
fn destination_revenue(snapshot: &Snapshot, destination: &str) -> HashMap<Uuid, f64> {
    let mut means: HashMap<Uuid, Mean> = HashMap::new();
    for row in snapshot.history() {
        let Some(booking) = row.booking else { continue };
        if booking.destination != destination {
            continue;
        }
        if let Some(revenue) = booking.confirmed_revenue() {
            means.entry(row.assignment.agent_id).or_default().push(revenue);
        }
    }
    collapse(means)
}

fn collapse(means: HashMap<Uuid, Mean>) -> HashMap<Uuid, f64> {
    means
        .into_iter()
        .filter_map(|(agent_id, mean)| mean.value().map(|value| (agent_id, value)))
        .collect()
}
