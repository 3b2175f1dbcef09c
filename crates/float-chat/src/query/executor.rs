//! Constraint execution with progressive time-window widening.
//!
//! Sparse sensor coverage means strict recent-window queries frequently come
//! back empty; a best-effort stale answer beats a hard failure, so relative
//! windows are relaxed through a fixed escalation sequence. Absolute ranges
//! are never widened.

use chrono::{DateTime, Duration, Utc};

use crate::error::QueryError;
use crate::query::constraints::{ConstraintSet, TimeWindow};
use crate::storage::{FloatStore, StoreQuery};
use crate::types::FloatRecord;

/// Widening escalation in days; `None` is the unbounded final step.
const WIDENING_STEPS: &[Option<i64>] = &[Some(30), Some(90), Some(180), None];

/// Execute a constraint set, widening an empty relative window until rows
/// appear or the escalation sequence is exhausted.
pub async fn execute(
    store: &dyn FloatStore,
    constraints: &ConstraintSet,
) -> Result<Vec<FloatRecord>, QueryError> {
    constraints.validate()?;

    let now = Utc::now();
    let bounds = match &constraints.window {
        Some(TimeWindow::Absolute { start, end }) => (Some(*start), Some(*end)),
        Some(TimeWindow::RelativeDays(days)) => (Some(now - Duration::days(*days)), None),
        None => (None, None),
    };

    let rows = run(store, constraints, bounds).await?;
    if !rows.is_empty() || !matches!(constraints.window, Some(TimeWindow::RelativeDays(_))) {
        return Ok(rows);
    }

    for step in WIDENING_STEPS {
        match step {
            Some(days) => tracing::debug!(days, "widening empty recency window"),
            None => tracing::debug!("widening to unbounded time range"),
        }
        let start = step.map(|days| now - Duration::days(days));
        let rows = run(store, constraints, (start, None)).await?;
        if !rows.is_empty() {
            return Ok(rows);
        }
    }
    Ok(Vec::new())
}

async fn run(
    store: &dyn FloatStore,
    constraints: &ConstraintSet,
    (start, end): (Option<DateTime<Utc>>, Option<DateTime<Utc>>),
) -> Result<Vec<FloatRecord>, QueryError> {
    let query = StoreQuery {
        parameter: constraints.parameter,
        region: constraints.region,
        start,
        end,
        limit: constraints.limit,
        newest_first: true,
    };
    store
        .query(&query)
        .await
        .map_err(|e| QueryError::Storage(e.to_string()))
}
