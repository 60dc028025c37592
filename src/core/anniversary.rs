use crate::domain::model::{Anniversary, FamilyGraph, IdentityPair, RelationshipKind};
use crate::domain::ports::RelationshipStore;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

impl Anniversary {
    /// Whole days elapsed since the relation started, never negative.
    pub fn elapsed_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.since).num_days().max(0)
    }

    /// Human readable age: "N years", "N months" or "N days".
    pub fn describe(&self, now: DateTime<Utc>) -> String {
        let days = self.elapsed_days(now);
        if days >= 365 {
            format!("{} years", days / 365)
        } else if days >= 30 {
            format!("{} months", days / 30)
        } else {
            format!("{} days", days)
        }
    }
}

/// One anniversary per identity pair and relationship kind among the edges
/// the graph was built from. Duplicate records keep the earliest start.
pub fn collect_anniversaries(graph: &FamilyGraph) -> Vec<Anniversary> {
    let mut by_key: BTreeMap<(IdentityPair, RelationshipKind), Anniversary> = BTreeMap::new();

    for edge in &graph.edges {
        let key = (edge.pair(), edge.kind);
        let candidate = Anniversary {
            pair: edge.pair(),
            kind: edge.kind,
            since: edge.created_at,
        };
        by_key
            .entry(key)
            .and_modify(|existing| {
                if candidate.since < existing.since {
                    existing.since = candidate.since;
                }
            })
            .or_insert(candidate);
    }

    by_key.into_values().collect()
}

/// Store-wide scan of accepted marriages already in effect at `now`, oldest first.
pub async fn marriage_anniversaries<S>(store: &S, now: DateTime<Utc>) -> Result<Vec<Anniversary>>
where
    S: RelationshipStore + ?Sized,
{
    let mut anniversaries: Vec<Anniversary> = store
        .find_accepted_marriages()
        .await?
        .into_iter()
        .filter(|edge| edge.kind == RelationshipKind::Marriage && edge.a != edge.b)
        .filter(|edge| edge.created_at <= now)
        .map(|edge| Anniversary {
            pair: edge.pair(),
            kind: edge.kind,
            since: edge.created_at,
        })
        .collect();
    anniversaries.sort_by(|x, y| x.since.cmp(&y.since).then_with(|| x.pair.cmp(&y.pair)));
    Ok(anniversaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Identity;
    use chrono::{Duration, TimeZone};

    fn anniversary(days_ago: i64, now: DateTime<Utc>) -> Anniversary {
        Anniversary {
            pair: IdentityPair::new(Identity::new("a"), Identity::new("b")),
            kind: RelationshipKind::Marriage,
            since: now - Duration::days(days_ago),
        }
    }

    #[test]
    fn test_describe_picks_largest_unit() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(anniversary(0, now).describe(now), "0 days");
        assert_eq!(anniversary(29, now).describe(now), "29 days");
        assert_eq!(anniversary(30, now).describe(now), "1 months");
        assert_eq!(anniversary(364, now).describe(now), "12 months");
        assert_eq!(anniversary(365, now).describe(now), "1 years");
        assert_eq!(anniversary(800, now).describe(now), "2 years");
    }

    #[test]
    fn test_future_start_counts_as_today() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(anniversary(-3, now).elapsed_days(now), 0);
    }
}
