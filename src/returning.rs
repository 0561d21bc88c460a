use std::cmp::Reverse;

use uuid::Uuid;

use crate::snapshot::Snapshot;

/// The agent behind the customer's most recent confirmed booking.
///
/// Cancelled and pending bookings never qualify, however recent. When several
/// confirmed bookings share the latest date, the lowest assignment id wins.
pub fn resolve_prior_agent(snapshot: &Snapshot, customer_name: &str) -> Option<Uuid> {
    snapshot
        .bookings()
        .iter()
        .filter(|booking| booking.customer_name == customer_name && booking.status.is_confirmed())
        .filter_map(|booking| {
            snapshot
                .assignment(booking.assignment_id)
                .map(|assignment| (booking.booking_date, assignment))
        })
        .max_by_key(|(date, assignment)| (*date, Reverse(assignment.id)))
        .map(|(_, assignment)| assignment.agent_id)
}
