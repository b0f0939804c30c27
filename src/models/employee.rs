//! Employee model and the derived leaderboard view.

use serde::{Deserialize, Serialize};

/// Plant sector an employee belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sector {
    Production,
    Office,
    Marketing,
    Admin,
}

impl Sector {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sector::Production => "PRODUCTION",
            Sector::Office => "OFFICE",
            Sector::Marketing => "MARKETING",
            Sector::Admin => "ADMIN",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PRODUCTION" => Some(Sector::Production),
            "OFFICE" => Some(Sector::Office),
            "MARKETING" => Some(Sector::Marketing),
            "ADMIN" => Some(Sector::Admin),
            _ => None,
        }
    }
}

/// A plant employee with a points wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub role: String,
    pub sector: Sector,
    pub points: i64,
    /// Never sent to clients.
    #[serde(skip_serializing, default)]
    pub pin: String,
    pub is_admin: bool,
}

/// Request body for the login endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub employee_id: String,
    pub pin: String,
}

/// Engagement level shown next to an employee's balance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Level {
    Novice,
    Expert,
    Veteran,
    Legend,
}

impl Level {
    /// Level for a balance plus percent progress toward the next one.
    pub fn for_points(points: i64) -> (Self, u8) {
        fn progress(points: i64, floor: i64, ceiling: i64) -> u8 {
            let pct = (points - floor).max(0) * 100 / (ceiling - floor);
            pct.clamp(0, 100) as u8
        }

        if points < 200 {
            (Level::Novice, progress(points, 0, 200))
        } else if points < 500 {
            (Level::Expert, progress(points, 200, 500))
        } else if points < 1000 {
            (Level::Veteran, progress(points, 500, 1000))
        } else {
            (Level::Legend, 100)
        }
    }
}

/// One row of the leaderboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub employee_id: String,
    pub name: String,
    pub role: String,
    pub sector: Sector,
    pub points: i64,
    pub level: Level,
    pub level_progress: u8,
}

/// Rank non-admin employees by points, highest first.
pub fn leaderboard(employees: &[Employee]) -> Vec<LeaderboardEntry> {
    let mut ranked: Vec<&Employee> = employees.iter().filter(|e| !e.is_admin).collect();
    ranked.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.name.cmp(&b.name)));

    ranked
        .into_iter()
        .enumerate()
        .map(|(index, employee)| {
            let (level, level_progress) = Level::for_points(employee.points);
            LeaderboardEntry {
                rank: index + 1,
                employee_id: employee.id.clone(),
                name: employee.name.clone(),
                role: employee.role.clone(),
                sector: employee.sector,
                points: employee.points,
                level,
                level_progress,
            }
        })
        .collect()
}
