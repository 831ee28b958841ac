//! Utility functions and structures for reporting search results.

use std::time::Duration;

use crate::ant::Stop;

/// Format a duration as hours, minutes, and seconds.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}h {:02}m {:02}s", hours, minutes, seconds)
}

/// Format a minute of day as `HH:MM`.
pub fn format_minute(minute: u32) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

/// Parse `HH:MM` into a minute of day.
pub fn parse_minute(text: &str) -> Option<u32> {
    let (hours, minutes) = text.trim().split_once(':')?;
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if hours >= 24 || minutes >= 60 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Render an itinerary as `A(09:00) -> B(09:40) | day 2: C(10:00)`.
pub fn format_itinerary(itinerary: &[Stop]) -> String {
    let mut out = String::new();

    for (i, stop) in itinerary.iter().enumerate() {
        if i > 0 {
            if stop.day != itinerary[i - 1].day {
                out.push_str(&format!(" | day {}: ", stop.day));
            } else {
                out.push_str(" -> ");
            }
        }
        out.push_str(&format!("{}({})", stop.location, format_minute(stop.arrival_minute)));
    }

    out
}

/// Generate statistics about the search process.
pub struct SearchStatistics {
    pub generations: u32,
    pub runtime: Duration,
    pub colonies: usize,
    pub best_fitness: f64,
    pub best_visited: usize,
    pub best_start_location: Option<String>,
    pub last_mean_fitness: f64,
}

impl SearchStatistics {
    /// Format the statistics as a string.
    pub fn format(&self) -> String {
        format!(
            "Search Statistics:
- Generations: {}
- Runtime: {}
- Colonies: {}
- Best Fitness: {:.2}
- Best Locations Visited: {}
- Best Start Location: {}
- Last Mean Fitness: {:.2}",
            self.generations,
            format_duration(self.runtime),
            self.colonies,
            self.best_fitness,
            self.best_visited,
            self.best_start_location.as_deref().unwrap_or("-"),
            self.last_mean_fitness
        )
    }
}

/// Format a start location ranking as one line per location.
pub fn format_ranking(ranking: &[(String, f64)]) -> String {
    ranking
        .iter()
        .map(|(location, mean_visited)| {
            format!("- {:25}  mean visited: {:.2}", location, mean_visited)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
