use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::period;

/// A savings goal. The stored amount is clamped to `0..=target` whenever a
/// contribution lands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub id: u64,
    pub icon: String,
    pub name: String,
    #[serde(rename = "targetAmount")]
    pub target: f64,
    #[serde(rename = "currentAmount", default)]
    pub current: f64,
    #[serde(rename = "deadlineMonths")]
    pub deadline_months: i32,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Goal {
    pub fn new(
        icon: impl Into<String>,
        name: impl Into<String>,
        target: f64,
        deadline_months: i32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            icon: icon.into(),
            name: name.into(),
            target,
            current: 0.0,
            deadline_months,
            created_at,
        }
    }
}

/// Derived view of a goal's trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalProgress {
    pub goal_id: u64,
    pub percentage: f64,
    pub months_remaining: i32,
    /// Required monthly contribution to finish on time; `None` once the
    /// deadline has passed.
    pub monthly_need: Option<f64>,
}

impl GoalProgress {
    pub fn deadline_passed(&self) -> bool {
        self.monthly_need.is_none()
    }
}

pub fn progress(goal: &Goal, today: NaiveDate) -> GoalProgress {
    let percentage = if goal.target > 0.0 {
        (goal.current / goal.target * 100.0).min(100.0)
    } else {
        100.0
    };
    let elapsed = period::months_between(goal.created_at.date_naive(), today);
    let months_remaining = goal.deadline_months - elapsed;
    let monthly_need = if months_remaining > 0 {
        Some((goal.target - goal.current) / months_remaining as f64)
    } else {
        None
    };
    GoalProgress {
        goal_id: goal.id,
        percentage,
        months_remaining,
        monthly_need,
    }
}
