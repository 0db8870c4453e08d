use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::executor::Outcome;

/// Whole-run metrics. Latency fields cover successful outcomes only and are
/// zero when there were none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_time: f64,
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub success_rate: f64,
    pub avg_response_time: f64,
    pub min_response_time: f64,
    pub max_response_time: f64,
    pub requests_per_second: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointStats {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub success_rate: f64,
    pub avg_response_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub summary: Summary,
    /// Keyed by endpoint path, only endpoints with at least one observed
    /// outcome appear.
    pub endpoint_stats: BTreeMap<String, EndpointStats>,
}

/// Pure merge of the flattened outcome multiset. Order of the input carries
/// no meaning and does not affect the result.
#[must_use]
pub fn aggregate(outcomes: &[Outcome], wall_clock: Duration) -> AggregateStats {
    let total = outcomes.len();
    let successful: Vec<&Outcome> = outcomes.iter().filter(|o| o.success).collect();
    // An empty successful-set reports zero latencies, not infinity or NaN.
    let min_response_time = if successful.is_empty() {
        0.0
    } else {
        successful
            .iter()
            .map(|o| o.response_time)
            .fold(f64::INFINITY, f64::min)
    };
    let max_response_time = successful
        .iter()
        .map(|o| o.response_time)
        .fold(0.0, f64::max);
    let summary = Summary {
        total_time: wall_clock.as_secs_f64(),
        total_requests: total,
        successful_requests: successful.len(),
        failed_requests: total - successful.len(),
        success_rate: rate(successful.len(), total),
        avg_response_time: avg_latency(&successful),
        min_response_time,
        max_response_time,
        requests_per_second: throughput(total, wall_clock),
    };

    let mut endpoint_stats: BTreeMap<String, EndpointStats> = BTreeMap::new();
    let mut grouped: BTreeMap<&str, Vec<&Outcome>> = BTreeMap::new();
    for outcome in outcomes {
        grouped.entry(&outcome.endpoint).or_default().push(outcome);
    }
    for (endpoint, group) in grouped {
        let group_successful: Vec<&Outcome> =
            group.iter().filter(|o| o.success).copied().collect();
        endpoint_stats.insert(
            endpoint.to_string(),
            EndpointStats {
                total_requests: group.len(),
                successful_requests: group_successful.len(),
                success_rate: rate(group_successful.len(), group.len()),
                avg_response_time: avg_latency(&group_successful),
            },
        );
    }
    AggregateStats {
        summary,
        endpoint_stats,
    }
}

fn rate(successful: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    100.0 * successful as f64 / total as f64
}

fn avg_latency(successful: &[&Outcome]) -> f64 {
    if successful.is_empty() {
        return 0.0;
    }
    // Summing in a fixed order keeps the float result identical no matter
    // how the outcome collection was shuffled.
    let mut times: Vec<f64> = successful.iter().map(|o| o.response_time).collect();
    times.sort_by(f64::total_cmp);
    times.iter().sum::<f64>() / times.len() as f64
}

fn throughput(total: usize, wall_clock: Duration) -> f64 {
    let secs = wall_clock.as_secs_f64();
    if secs <= 0.0 {
        return 0.0;
    }
    total as f64 / secs
}

#[cfg(test)]
mod tests {
    use super::{aggregate, AggregateStats};
    use crate::executor::Outcome;
    use std::time::Duration;

    fn outcome(endpoint: &str, status_code: u16, response_time: f64) -> Outcome {
        Outcome {
            endpoint: endpoint.to_string(),
            status_code,
            response_time,
            success: status_code == 200,
            error: if status_code == 0 {
                Some("connection refused".to_string())
            } else {
                None
            },
        }
    }

    fn mixed_outcomes() -> Vec<Outcome> {
        vec![
            outcome("/a", 200, 10.0),
            outcome("/a", 200, 20.0),
            outcome("/a", 500, 5.0),
            outcome("/b", 200, 40.0),
            outcome("/b", 0, 1000.0),
            outcome("/c", 503, 2.0),
        ]
    }

    #[test]
    fn empty_collection_aggregates_to_zeroes() {
        let stats = aggregate(&[], Duration::from_secs(1));
        assert_eq!(0, stats.summary.total_requests);
        assert_eq!(0.0, stats.summary.success_rate);
        assert_eq!(0.0, stats.summary.avg_response_time);
        assert_eq!(0.0, stats.summary.min_response_time);
        assert_eq!(0.0, stats.summary.max_response_time);
        assert!(stats.endpoint_stats.is_empty());
    }

    #[test]
    fn per_endpoint_totals_sum_to_global_total() {
        let stats = aggregate(&mixed_outcomes(), Duration::from_secs(2));
        let per_endpoint_total: usize = stats
            .endpoint_stats
            .values()
            .map(|s| s.total_requests)
            .sum();
        assert_eq!(stats.summary.total_requests, per_endpoint_total);
    }

    #[test]
    fn latency_covers_successful_outcomes_only() {
        let stats = aggregate(&mixed_outcomes(), Duration::from_secs(2));
        // Successes: 10, 20, 40. The failed 5ms/1000ms/2ms samples are excluded.
        assert_eq!(10.0, stats.summary.min_response_time);
        assert_eq!(40.0, stats.summary.max_response_time);
        assert!(
            stats.summary.min_response_time <= stats.summary.avg_response_time
                && stats.summary.avg_response_time <= stats.summary.max_response_time
        );
        assert_eq!(3, stats.summary.successful_requests);
        assert_eq!(3, stats.summary.failed_requests);
    }

    #[test]
    fn all_failures_still_produce_a_report() {
        let outcomes = vec![outcome("/a", 0, 100.0), outcome("/a", 500, 3.0)];
        let stats = aggregate(&outcomes, Duration::from_secs(1));
        assert_eq!(0.0, stats.summary.success_rate);
        assert_eq!(0.0, stats.summary.avg_response_time);
        assert_eq!(0.0, stats.summary.min_response_time);
        assert_eq!(0.0, stats.summary.max_response_time);
        assert_eq!(2, stats.summary.total_requests);
    }

    #[test]
    fn success_rate_stays_within_bounds() {
        let stats = aggregate(&mixed_outcomes(), Duration::from_secs(2));
        assert!(stats.summary.success_rate >= 0.0 && stats.summary.success_rate <= 100.0);
        for endpoint in stats.endpoint_stats.values() {
            assert!(endpoint.success_rate >= 0.0 && endpoint.success_rate <= 100.0);
        }
    }

    #[test]
    fn unobserved_endpoints_are_omitted() {
        let outcomes = vec![outcome("/a", 200, 10.0)];
        let stats = aggregate(&outcomes, Duration::from_secs(1));
        assert!(stats.endpoint_stats.contains_key("/a"));
        assert!(!stats.endpoint_stats.contains_key("/b"));
    }

    #[test]
    fn aggregation_is_order_insensitive() {
        let outcomes = mixed_outcomes();
        let forward: AggregateStats = aggregate(&outcomes, Duration::from_secs(2));
        let mut shuffled = outcomes;
        shuffled.reverse();
        shuffled.swap(0, 3);
        let backward = aggregate(&shuffled, Duration::from_secs(2));
        assert_eq!(forward, backward);
    }

    #[test]
    fn order_insensitive_even_with_inexact_sums() {
        // 0.1 + 0.2 + 0.3 differs between summation orders at the ULP level,
        // the fixed-order reduction must erase that.
        let outcomes = vec![
            outcome("/a", 200, 0.1),
            outcome("/a", 200, 0.2),
            outcome("/a", 200, 0.3),
            outcome("/a", 200, 0.7),
        ];
        let forward = aggregate(&outcomes, Duration::from_secs(1));
        let mut shuffled = outcomes;
        shuffled.reverse();
        shuffled.swap(1, 2);
        let backward = aggregate(&shuffled, Duration::from_secs(1));
        assert_eq!(forward, backward);
    }

    #[test]
    fn throughput_is_total_over_wall_clock() {
        let stats = aggregate(&mixed_outcomes(), Duration::from_secs(2));
        assert_eq!(3.0, stats.summary.requests_per_second);
        assert_eq!(2.0, stats.summary.total_time);
    }
}
