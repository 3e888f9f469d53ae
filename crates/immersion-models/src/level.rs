use serde::Serialize;

/// Named hour-range bucket used to gamify cumulative watch time
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ImmersionLevel {
    pub name: &'static str,
    /// Inclusive lower bound in hours
    pub start: f64,
    /// Exclusive upper bound in hours
    pub end: f64,
    pub color: &'static str,
}

/// Ordered, non-overlapping level table. The last entry doubles as the ceiling.
pub const IMMERSION_LEVELS: [ImmersionLevel; 6] = [
    ImmersionLevel { name: "Beginner", start: 0.0, end: 50.0, color: "#FFC107" },
    ImmersionLevel { name: "Beginner 1", start: 50.0, end: 200.0, color: "#FF9800" },
    ImmersionLevel { name: "Beginner 2", start: 200.0, end: 400.0, color: "#FF5722" },
    ImmersionLevel { name: "Intermediate", start: 400.0, end: 800.0, color: "#2196F3" },
    ImmersionLevel { name: "Intermediate 2", start: 800.0, end: 1300.0, color: "#3F51B5" },
    ImmersionLevel { name: "Advanced", start: 1300.0, end: 1800.0, color: "#4CAF50" },
];

impl ImmersionLevel {
    pub fn contains(&self, hours: f64) -> bool {
        hours >= self.start && hours < self.end
    }

    pub fn span(&self) -> f64 {
        self.end - self.start
    }
}
