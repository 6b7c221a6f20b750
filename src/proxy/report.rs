//! Grouping and statistics over successful probe outcomes

use crate::proxy::models::{ProbeOutcome, ProxyType};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Number of countries listed per protocol group
pub const TOP_COUNTRIES: usize = 5;

/// Working proxies of one protocol, fastest first
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolGroup {
    pub proxy_type: ProxyType,
    pub outcomes: Vec<ProbeOutcome>,
    pub average: Duration,
    pub top_countries: Vec<(String, usize)>,
}

impl ProtocolGroup {
    fn new(proxy_type: ProxyType, mut outcomes: Vec<ProbeOutcome>) -> Self {
        // Stable, so equal durations keep their input order
        outcomes.sort_by(|a, b| a.elapsed.cmp(&b.elapsed));

        let average = mean(outcomes.iter().map(|o| o.elapsed));
        let top_countries = top_countries(
            outcomes.iter().filter_map(|o| o.country.as_deref()),
            TOP_COUNTRIES,
        );

        Self {
            proxy_type,
            outcomes,
            average,
            top_countries,
        }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// All working proxies grouped by protocol
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedReport {
    groups: BTreeMap<ProxyType, ProtocolGroup>,
}

impl GroupedReport {
    /// Group outcomes by protocol and compute per-group statistics
    pub fn build(outcomes: Vec<ProbeOutcome>) -> Self {
        let mut by_type: BTreeMap<ProxyType, Vec<ProbeOutcome>> = BTreeMap::new();
        for outcome in outcomes {
            by_type.entry(outcome.proxy_type()).or_default().push(outcome);
        }

        let groups = by_type
            .into_iter()
            .map(|(proxy_type, outcomes)| (proxy_type, ProtocolGroup::new(proxy_type, outcomes)))
            .collect();

        Self { groups }
    }

    /// Groups in protocol order
    pub fn groups(&self) -> impl Iterator<Item = &ProtocolGroup> {
        self.groups.values()
    }

    pub fn group(&self, proxy_type: ProxyType) -> Option<&ProtocolGroup> {
        self.groups.get(&proxy_type)
    }

    /// Total number of working proxies across all groups
    pub fn total(&self) -> usize {
        self.groups.values().map(ProtocolGroup::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

fn mean(durations: impl Iterator<Item = Duration>) -> Duration {
    let (sum, count) = durations.fold((Duration::ZERO, 0u32), |(sum, count), d| {
        (sum + d, count + 1)
    });
    if count == 0 {
        Duration::ZERO
    } else {
        sum / count
    }
}

/// Most common labels, by descending count; ties keep first-seen order
pub fn top_countries<'a>(
    countries: impl Iterator<Item = &'a str>,
    limit: usize,
) -> Vec<(String, usize)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for country in countries {
        match index.get(country) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(country, counts.len());
                counts.push((country.to_string(), 1));
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(limit);
    counts
}
