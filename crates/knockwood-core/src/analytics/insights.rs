//! Insight heuristics over the derived mood series.
//!
//! A fixed, ordered set of rules, each producing at most one insight. The
//! final list is partitioned high-priority-first without disturbing the
//! relative order inside each priority class.

use serde::{Deserialize, Serialize};

use super::{MoodDataPoint, RitualMoodData, TimeOfDayMood};

/// Minimum samples before a bucket/ritual is worth an insight.
const MIN_SAMPLES: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    BestTimeOfDay,
    BestRitual,
    PositiveTrend,
    ConcerningTrend,
}

/// One generated observation about the user's mood data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodInsight {
    pub kind: InsightKind,
    pub message: String,
    pub high_priority: bool,
}

/// Run every heuristic in order, then move high-priority insights to the
/// front (stable partition).
pub fn generate_insights(
    time_of_day: &[TimeOfDayMood],
    ritual_moods: &[RitualMoodData],
    weekly: &[MoodDataPoint],
) -> Vec<MoodInsight> {
    let mut insights = Vec::new();

    if let Some(best) = time_of_day
        .iter()
        .filter(|b| b.count >= MIN_SAMPLES)
        .max_by(|a, b| a.average_mood.total_cmp(&b.average_mood))
    {
        insights.push(MoodInsight {
            kind: InsightKind::BestTimeOfDay,
            message: format!(
                "Your mood peaks in the {} (avg {:.1}).",
                best.period.label().to_lowercase(),
                best.average_mood
            ),
            high_priority: false,
        });
    }

    if let Some(best) = ritual_moods
        .iter()
        .filter(|r| r.sample_count >= MIN_SAMPLES)
        .max_by(|a, b| a.average_mood.total_cmp(&b.average_mood))
    {
        insights.push(MoodInsight {
            kind: InsightKind::BestRitual,
            message: format!(
                "{} leaves you feeling best (avg {:.1}).",
                best.ritual_name, best.average_mood
            ),
            high_priority: false,
        });
    }

    if let Some(avg) = weighted_average(weekly) {
        if avg >= 4.0 {
            insights.push(MoodInsight {
                kind: InsightKind::PositiveTrend,
                message: "Your week is trending bright. Whatever you're knocking on, keep knocking."
                    .to_string(),
                high_priority: true,
            });
        } else if avg <= 2.5 {
            insights.push(MoodInsight {
                kind: InsightKind::ConcerningTrend,
                message: "Your mood has been low this week. Be gentle with yourself.".to_string(),
                high_priority: true,
            });
        }
    }

    // Stable: relative order within each priority class is preserved.
    insights.sort_by_key(|i| !i.high_priority);
    insights
}

fn weighted_average(points: &[MoodDataPoint]) -> Option<f64> {
    let total: u32 = points.iter().map(|p| p.count).sum();
    if total == 0 {
        return None;
    }
    let sum: f64 = points
        .iter()
        .map(|p| p.average_mood * f64::from(p.count))
        .sum();
    Some(sum / f64::from(total))
}
