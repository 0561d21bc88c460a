//! Read-only view over agents, assignments and bookings for one scoring run.
//!
//! A `Snapshot` is validated and indexed once at construction; every derived
//! view (summaries, contextual metrics, prior agent) borrows from it.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::error::{RankError, Result};
use crate::models::{Agent, AssignmentRecord, BookingRecord};

#[derive(Debug, Clone)]
pub struct Snapshot {
    agents: Vec<Agent>,
    assignments: Vec<AssignmentRecord>,
    bookings: Vec<BookingRecord>,
    booking_by_assignment: HashMap<Uuid, usize>,
    assignment_by_id: HashMap<Uuid, usize>,
}

/// One assignment joined to its booking, if any.
#[derive(Debug, Clone, Copy)]
pub struct HistoryRow<'a> {
    pub assignment: &'a AssignmentRecord,
    pub booking: Option<&'a BookingRecord>,
}

impl HistoryRow<'_> {
    pub fn is_confirmed(&self) -> bool {
        self.booking.is_some_and(|booking| booking.status.is_confirmed())
    }
}

impl Snapshot {
    pub fn new(
        agents: Vec<Agent>,
        assignments: Vec<AssignmentRecord>,
        bookings: Vec<BookingRecord>,
    ) -> Result<Self> {
        let mut agent_ids = HashSet::new();
        for agent in &agents {
            if !agent_ids.insert(agent.id) {
                return Err(integrity(format!("duplicate agent id {}", agent.id)));
            }
            if let Some(rating) = agent.average_rating {
                if !(0.0..=5.0).contains(&rating) {
                    return Err(integrity(format!(
                        "agent {} has rating {rating} outside 0..=5",
                        agent.id
                    )));
                }
            }
            if let Some(years) = agent.years_of_service {
                if !years.is_finite() || years < 0.0 {
                    return Err(integrity(format!(
                        "agent {} has invalid years of service {years}",
                        agent.id
                    )));
                }
            }
        }

        let mut assignment_by_id = HashMap::with_capacity(assignments.len());
        for (index, assignment) in assignments.iter().enumerate() {
            if !agent_ids.contains(&assignment.agent_id) {
                return Err(integrity(format!(
                    "assignment {} references unknown agent {}",
                    assignment.id, assignment.agent_id
                )));
            }
            if assignment_by_id.insert(assignment.id, index).is_some() {
                return Err(integrity(format!(
                    "duplicate assignment id {}",
                    assignment.id
                )));
            }
        }

        let mut booking_by_assignment = HashMap::with_capacity(bookings.len());
        for (index, booking) in bookings.iter().enumerate() {
            if !assignment_by_id.contains_key(&booking.assignment_id) {
                return Err(integrity(format!(
                    "booking {} references unknown assignment {}",
                    booking.id, booking.assignment_id
                )));
            }
            if let Some(revenue) = booking.total_revenue {
                if !revenue.is_finite() || revenue < 0.0 {
                    return Err(integrity(format!(
                        "booking {} has invalid revenue {revenue}",
                        booking.id
                    )));
                }
            }
            if booking_by_assignment
                .insert(booking.assignment_id, index)
                .is_some()
            {
                return Err(integrity(format!(
                    "assignment {} has more than one booking",
                    booking.assignment_id
                )));
            }
        }

        Ok(Self {
            agents,
            assignments,
            bookings,
            booking_by_assignment,
            assignment_by_id,
        })
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn assignments(&self) -> &[AssignmentRecord] {
        &self.assignments
    }

    pub fn bookings(&self) -> &[BookingRecord] {
        &self.bookings
    }

    pub fn assignment(&self, id: Uuid) -> Option<&AssignmentRecord> {
        self.assignment_by_id
            .get(&id)
            .map(|&index| &self.assignments[index])
    }

    pub fn booking_for(&self, assignment_id: Uuid) -> Option<&BookingRecord> {
        self.booking_by_assignment
            .get(&assignment_id)
            .map(|&index| &self.bookings[index])
    }

    /// Every assignment joined to its optional booking, in load order.
    pub fn history(&self) -> impl Iterator<Item = HistoryRow<'_>> + '_ {
        self.assignments.iter().map(|assignment| HistoryRow {
            assignment,
            booking: self.booking_for(assignment.id),
        })
    }
}

fn integrity(message: String) -> RankError {
    RankError::DataIntegrity(message)
}
