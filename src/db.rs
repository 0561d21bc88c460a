use std::collections::HashMap;

use anyhow::Context;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::error::RankError;
use crate::models::{Agent, AssignmentRecord, BookingRecord, BookingStatus};
use crate::snapshot::Snapshot;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

type SeedBooking = (&'static str, &'static str, f64, &'static str, &'static str, NaiveDate);

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let agents = vec![
        (
            Uuid::parse_str("a41c7e92-5b0d-4f63-9e18-c2d7f0b83a55")?,
            "Marisol Vega",
            Some(4.5),
            Some(8.0),
        ),
        (
            Uuid::parse_str("5e9b2d14-73a8-4c0f-b6e1-09f4a2c7d318")?,
            "Theo Lindqvist",
            Some(4.1),
            Some(3.0),
        ),
        (
            Uuid::parse_str("c0d83f57-1e6a-49b2-8a7d-6b35e91f2c04")?,
            "Nadia Okafor",
            Some(4.8),
            Some(12.0),
        ),
        (
            Uuid::parse_str("8f0e4c3b-6a51-4d9e-a7c2-1b5f9e2d7c40")?,
            "Rowan Ellis",
            None,
            Some(1.0),
        ),
    ];

    let mut agent_ids = HashMap::new();
    for (id, name, rating, years) in agents {
        let agent_id: Uuid = sqlx::query(
            r#"
            INSERT INTO agent_ranking.agents
            (id, full_name, average_customer_service_rating, years_of_service)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (full_name) DO UPDATE
            SET average_customer_service_rating = EXCLUDED.average_customer_service_rating,
                years_of_service = EXCLUDED.years_of_service
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(rating)
        .bind(years)
        .fetch_one(pool)
        .await?
        .get("id");
        agent_ids.insert(name, agent_id);
    }

    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).context("invalid date");
    let history: Vec<(&str, &str, &str, &str, Option<SeedBooking>)> = vec![
        (
            "seed-001",
            "Marisol Vega",
            "Phone",
            "Referral",
            Some(("Dana Whitfield", "Confirmed", 145_000.0, "Bahamas", "Fort Lauderdale", date(2025, 3, 14)?)),
        ),
        (
            "seed-002",
            "Marisol Vega",
            "Email",
            "Website",
            Some(("Marcus Hale", "Confirmed", 98_000.0, "British Virgin Islands", "Tortola", date(2025, 5, 2)?)),
        ),
        (
            "seed-003",
            "Marisol Vega",
            "Phone",
            "Boat Show",
            Some(("Priya Nair", "Cancelled", 0.0, "Bahamas", "Nassau", date(2025, 6, 20)?)),
        ),
        ("seed-004", "Marisol Vega", "Email", "Website", None),
        (
            "seed-005",
            "Theo Lindqvist",
            "Email",
            "Website",
            Some(("Dana Whitfield", "Cancelled", 0.0, "Bahamas", "Fort Lauderdale", date(2025, 8, 9)?)),
        ),
        (
            "seed-006",
            "Theo Lindqvist",
            "Text",
            "Referral",
            Some(("Leo Brandt", "Confirmed", 62_000.0, "Bahamas", "Fort Lauderdale", date(2025, 4, 18)?)),
        ),
        (
            "seed-007",
            "Theo Lindqvist",
            "Phone",
            "Referral",
            Some(("Sofia Reyes", "Pending", 0.0, "Greece", "Athens", date(2025, 9, 1)?)),
        ),
        (
            "seed-008",
            "Nadia Okafor",
            "Phone",
            "Boat Show",
            Some(("Hannah Cole", "Confirmed", 210_000.0, "Greece", "Athens", date(2025, 2, 11)?)),
        ),
        (
            "seed-009",
            "Nadia Okafor",
            "Email",
            "Website",
            Some(("Omar Haddad", "Confirmed", 175_000.0, "Croatia", "Split", date(2025, 7, 23)?)),
        ),
        (
            "seed-010",
            "Nadia Okafor",
            "Phone",
            "Referral",
            Some(("Dana Whitfield", "Confirmed", 88_000.0, "Bahamas", "Nassau", date(2024, 12, 30)?)),
        ),
        ("seed-011", "Nadia Okafor", "Text", "Website", None),
        ("seed-012", "Rowan Ellis", "Phone", "Website", None),
    ];

    for (source_key, agent_name, method, lead, booking) in history {
        let agent_id = *agent_ids
            .get(agent_name)
            .with_context(|| format!("seed agent {agent_name} missing"))?;

        let assignment_id: Uuid = sqlx::query(
            r#"
            INSERT INTO agent_ranking.assignments
            (id, agent_id, communication_method, lead_source, source_key)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (source_key) DO UPDATE
            SET communication_method = EXCLUDED.communication_method,
                lead_source = EXCLUDED.lead_source
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(agent_id)
        .bind(method)
        .bind(lead)
        .bind(source_key)
        .fetch_one(pool)
        .await?
        .get("id");

        let Some((customer, status, revenue, destination, launch, booked_on)) = booking else {
            continue;
        };

        sqlx::query(
            r#"
            INSERT INTO agent_ranking.bookings
            (id, assignment_id, customer_name, booking_status, total_revenue,
             destination, launch_location, booking_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (assignment_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(assignment_id)
        .bind(customer)
        .bind(status)
        .bind(revenue)
        .bind(destination)
        .bind(launch)
        .bind(booked_on)
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// Read all three tables in one repeatable-read transaction so the snapshot
/// is consistent.
pub async fn load_snapshot(pool: &PgPool) -> Result<Snapshot, RankError> {
    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
        .execute(&mut *tx)
        .await?;

    let agent_rows = sqlx::query(
        "SELECT id, full_name, average_customer_service_rating, years_of_service \
         FROM agent_ranking.agents ORDER BY id",
    )
    .fetch_all(&mut *tx)
    .await?;

    let assignment_rows = sqlx::query(
        "SELECT id, agent_id, communication_method, lead_source \
         FROM agent_ranking.assignments ORDER BY id",
    )
    .fetch_all(&mut *tx)
    .await?;

    let booking_rows = sqlx::query(
        "SELECT id, assignment_id, customer_name, booking_status, total_revenue, \
         destination, launch_location, booking_date \
         FROM agent_ranking.bookings ORDER BY id",
    )
    .fetch_all(&mut *tx)
    .await?;

    tx.commit().await?;

    let mut agents = Vec::with_capacity(agent_rows.len());
    for row in agent_rows {
        agents.push(Agent {
            id: row.try_get("id")?,
            name: row.try_get("full_name")?,
            average_rating: row.try_get("average_customer_service_rating")?,
            years_of_service: row.try_get("years_of_service")?,
        });
    }

    let mut assignments = Vec::with_capacity(assignment_rows.len());
    for row in assignment_rows {
        assignments.push(AssignmentRecord {
            id: row.try_get("id")?,
            agent_id: row.try_get("agent_id")?,
            communication_method: row.try_get("communication_method")?,
            lead_source: row.try_get("lead_source")?,
        });
    }

    let mut bookings = Vec::with_capacity(booking_rows.len());
    for row in booking_rows {
        let status: String = row.try_get("booking_status")?;
        bookings.push(BookingRecord {
            id: row.try_get("id")?,
            assignment_id: row.try_get("assignment_id")?,
            customer_name: row.try_get("customer_name")?,
            status: BookingStatus::from(status.as_str()),
            total_revenue: row.try_get("total_revenue")?,
            destination: row.try_get("destination")?,
            launch_location: row.try_get("launch_location")?,
            booking_date: row.try_get("booking_date")?,
        });
    }

    info!(
        agents = agents.len(),
        assignments = assignments.len(),
        bookings = bookings.len(),
        "Loaded snapshot"
    );
    Snapshot::new(agents, assignments, bookings)
}
