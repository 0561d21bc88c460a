use std::fmt;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::{RankError, Result};

#[derive(Debug, Clone)]
pub struct Agent {
    pub id: Uuid,
    pub name: String,
    /// Average customer service rating on a 0 to 5 scale.
    pub average_rating: Option<f64>,
    pub years_of_service: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct AssignmentRecord {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub communication_method: String,
    pub lead_source: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    Pending,
    Other(String),
}

impl BookingStatus {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, BookingStatus::Confirmed)
    }
}

impl From<&str> for BookingStatus {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "confirmed" => BookingStatus::Confirmed,
            "cancelled" | "canceled" => BookingStatus::Cancelled,
            "pending" => BookingStatus::Pending,
            _ => BookingStatus::Other(value.trim().to_string()),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Confirmed => f.write_str("Confirmed"),
            BookingStatus::Cancelled => f.write_str("Cancelled"),
            BookingStatus::Pending => f.write_str("Pending"),
            BookingStatus::Other(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BookingRecord {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub customer_name: String,
    pub status: BookingStatus,
    /// Only meaningful when the booking is confirmed.
    pub total_revenue: Option<f64>,
    pub destination: String,
    pub launch_location: String,
    pub booking_date: NaiveDate,
}

impl BookingRecord {
    pub fn confirmed_revenue(&self) -> Option<f64> {
        self.status
            .is_confirmed()
            .then(|| self.total_revenue.unwrap_or(0.0))
    }
}

/// The attributes of a new customer inquiry. Every field is required.
#[derive(Debug, Clone)]
pub struct Inquiry {
    pub customer_name: String,
    pub communication_method: String,
    pub lead_source: String,
    pub destination: String,
    pub launch_location: String,
}

impl Inquiry {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("customer name", &self.customer_name),
            ("communication method", &self.communication_method),
            ("lead source", &self.lead_source),
            ("destination", &self.destination),
            ("launch location", &self.launch_location),
        ];

        for (label, value) in fields {
            if value.trim().is_empty() {
                return Err(RankError::InvalidInquiry(format!("{label} is required")));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct AgentSummary {
    pub agent_id: Uuid,
    pub agent_name: String,
    pub average_rating: f64,
    pub years_of_service: f64,
    pub total_assignments: usize,
    pub confirmed_bookings: usize,
    pub cancelled_bookings: usize,
    pub pending_bookings: usize,
    pub unbooked_assignments: usize,
    pub conversion_rate: f64,
    pub avg_revenue_per_booking: f64,
}

/// Performance restricted to history matching one inquiry attribute.
/// `None` means the agent had no matching rows, which is not the same as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContextualMetrics {
    pub comm_conversion_rate: Option<f64>,
    pub lead_conversion_rate: Option<f64>,
    pub destination_avg_revenue: Option<f64>,
    pub launch_conversion_rate: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextDimension {
    CommunicationMethod,
    LeadSource,
    Destination,
    LaunchLocation,
}

impl fmt::Display for ContextDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ContextDimension::CommunicationMethod => "communication method",
            ContextDimension::LeadSource => "lead source",
            ContextDimension::Destination => "destination",
            ContextDimension::LaunchLocation => "launch location",
        };
        f.write_str(label)
    }
}

/// Weighted contribution of each term to a composite score.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub service_rating: f64,
    pub conversion: f64,
    pub revenue: f64,
    pub tenure: f64,
    pub communication: f64,
    pub lead_source: f64,
    pub destination: f64,
    pub launch_location: f64,
    pub fallbacks: Vec<ContextDimension>,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.service_rating
            + self.conversion
            + self.revenue
            + self.tenure
            + self.communication
            + self.lead_source
            + self.destination
            + self.launch_location
    }
}

#[derive(Debug, Clone)]
pub struct RankedAgent {
    pub agent_id: Uuid,
    pub agent_name: String,
    pub score: f64,
    pub returning_customer: bool,
    /// Absent for the returning-customer override.
    pub breakdown: Option<ScoreBreakdown>,
}
