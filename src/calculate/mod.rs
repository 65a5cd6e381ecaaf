//! Statistics calculation engine.
//!
//! Pure functions over an already materialized slice of runs:
//! - Placement distribution as percentages
//! - Runs per hero and each hero's share of the season
//! - Hero × placement tables with a total row
//!
//! Nothing here does I/O or keeps state, so any function may be called
//! concurrently for different users or seasons.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{
    canonical_hero_name, CategoryCounts, HeroRunCounts, HeroShare, PlacementCategory,
    PlacementPercentages, Run, SeasonReport, StatsRow, StatsTable, TieringPolicy, TOTAL_ROW,
};

/// Round to 2 decimal places. Exact ties go to the even neighbour.
///
/// `value * 100.0` can itself be rounded onto a `.5`, so the fused
/// residual decides which side of the tie the true product lies on.
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    let floor = scaled.floor();
    let rounded = if scaled - floor != 0.5 {
        scaled.round()
    } else {
        let residual = value.mul_add(100.0, -scaled);
        if residual > 0.0 {
            floor + 1.0
        } else if residual < 0.0 || floor % 2.0 == 0.0 {
            floor
        } else {
            floor + 1.0
        }
    };
    rounded / 100.0
}

/// `count / total` as a percentage rounded to 2 decimals; 0 when `total` is 0.
pub fn percentage(count: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        round2(count as f64 / total as f64 * 100.0)
    }
}

/// Count runs per placement category.
pub fn count_categories(runs: &[Run], policy: TieringPolicy) -> CategoryCounts {
    let mut counts = CategoryCounts::default();
    for run in runs {
        counts.increment(run.category_with(policy));
    }
    counts
}

/// Placement distribution using the standard tiering.
pub fn placement_percentages(runs: &[Run]) -> PlacementPercentages {
    placement_percentages_with(runs, TieringPolicy::Standard)
}

pub fn placement_percentages_with(runs: &[Run], policy: TieringPolicy) -> PlacementPercentages {
    let counts = count_categories(runs, policy);
    let total = runs.len() as u32;

    PlacementPercentages {
        categories: PlacementCategory::ALL.to_vec(),
        percentages: PlacementCategory::ALL
            .iter()
            .map(|c| percentage(counts.get(*c), total))
            .collect(),
    }
}

fn count_by_hero(runs: &[Run]) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    for run in runs {
        *counts.entry(run.canonical_hero()).or_insert(0) += 1;
    }
    counts
}

/// Runs per canonical hero name. Only heroes that appear in `runs` are listed.
pub fn runs_per_hero(runs: &[Run]) -> HeroRunCounts {
    let (heroes, counts) = count_by_hero(runs).into_iter().unzip();
    HeroRunCounts { heroes, counts }
}

fn hero_rows<S: AsRef<str>>(runs: &[Run], roster: &[S]) -> BTreeSet<String> {
    roster
        .iter()
        .map(|h| canonical_hero_name(h.as_ref()))
        .chain(runs.iter().map(Run::canonical_hero))
        .collect()
}

/// Share of runs per hero over the roster plus every hero seen in `runs`.
pub fn hero_share<S: AsRef<str>>(runs: &[Run], roster: &[S]) -> HeroShare {
    let counts = count_by_hero(runs);
    let total = runs.len() as u32;

    let (heroes, percentages) = hero_rows(runs, roster)
        .into_iter()
        .map(|hero| {
            let share = percentage(counts.get(&hero).copied().unwrap_or(0), total);
            (hero, share)
        })
        .unzip();

    HeroShare {
        heroes,
        percentages,
    }
}

/// Hero × category table using the standard tiering.
pub fn build_stats_table<S: AsRef<str>>(runs: &[Run], roster: &[S]) -> StatsTable {
    build_stats_table_with(runs, roster, TieringPolicy::Standard)
}

/// Hero × category table over the roster plus every hero seen in `runs`,
/// followed by a "Total" row holding the column sums.
pub fn build_stats_table_with<S: AsRef<str>>(
    runs: &[Run],
    roster: &[S],
    policy: TieringPolicy,
) -> StatsTable {
    let mut grid: BTreeMap<String, CategoryCounts> = hero_rows(runs, roster)
        .into_iter()
        .map(|hero| (hero, CategoryCounts::default()))
        .collect();

    for run in runs {
        grid.entry(run.canonical_hero())
            .or_default()
            .increment(run.category_with(policy));
    }

    let mut total = CategoryCounts::default();
    let mut rows: Vec<StatsRow> = grid
        .into_iter()
        .map(|(hero, counts)| {
            total.add(&counts);
            StatsRow { hero, counts }
        })
        .collect();

    rows.push(StatsRow {
        hero: TOTAL_ROW.to_string(),
        counts: total,
    });

    StatsTable { rows }
}

/// Assemble every statistic shown for one user's season.
///
/// `runs` must hold the whole season, ranked and unranked. The two tables
/// are left out when the season is empty.
pub fn season_report<S: AsRef<str>>(
    season: i32,
    runs: &[Run],
    roster: &[S],
    policy: TieringPolicy,
) -> SeasonReport {
    let (ranked, unranked): (Vec<Run>, Vec<Run>) = runs.iter().cloned().partition(|r| r.ranked);

    let (ranked_table, unranked_table) = if runs.is_empty() {
        (None, None)
    } else {
        (
            Some(build_stats_table_with(&ranked, roster, policy)),
            Some(build_stats_table_with(&unranked, roster, policy)),
        )
    };

    SeasonReport {
        season,
        tiering: policy,
        total_runs: runs.len() as u32,
        placements: placement_percentages_with(runs, policy),
        runs_per_hero: runs_per_hero(runs),
        hero_share: hero_share(runs, roster),
        ranked: ranked_table,
        unranked: unranked_table,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    const ROSTER: [&str; 6] = ["Dooley", "Mak", "Pygmalien", "Vanessa", "Stelle", "Jules"];

    fn run(hero: &str, wins: i32, finished: i32, ranked: bool) -> Run {
        Run::new(
            1,
            0,
            ranked,
            hero.to_string(),
            wins,
            finished,
            Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap(),
        )
    }

    fn sample_runs() -> Vec<Run> {
        vec![
            run("dooley", 10, 10, true),
            run("DOOLEY", 10, 13, true),
            run("Mak", 7, 11, false),
            run("mak", 5, 8, false),
            run("Vanessa", 2, 6, true),
            run("Karnok", 8, 12, false),
        ]
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(10.714285), 10.71);
        assert_eq!(round2(89.285714), 89.29);
        assert_eq!(round2(0.0), 0.0);
        assert_eq!(round2(100.0), 100.0);
    }

    #[test]
    fn test_round2_ties_to_even() {
        assert_eq!(round2(3.125), 3.12);
        assert_eq!(round2(15.625), 15.62);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(-3.125), -3.12);
        // 1.005 is stored just below the tie
        assert_eq!(round2(1.005), 1.0);
        assert_eq!(round2(2.675), 2.67);
    }

    #[test]
    fn test_percentage_exact_ties() {
        assert_eq!(percentage(1, 32), 3.12);
        assert_eq!(percentage(5, 32), 15.62);
        assert_eq!(percentage(3, 8), 37.5);
        assert_eq!(percentage(1, 8), 12.5);
    }

    #[test]
    fn test_placement_percentages_with_exact_tie() {
        let mut runs = vec![run("Mak", 5, 8, true)];
        runs.extend((0..31).map(|_| run("Mak", 0, 0, true)));

        let pct = placement_percentages(&runs);

        assert_eq!(pct.percentages, vec![96.88, 3.12, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_percentage_zero_total() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(5, 0), 0.0);
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(2, 3), 66.67);
    }

    #[test]
    fn test_placement_percentages_empty() {
        let result = placement_percentages(&[]);
        assert_eq!(result.categories, PlacementCategory::ALL.to_vec());
        assert_eq!(result.percentages, vec![0.0; 5]);
    }

    #[test]
    fn test_placement_percentages_mixed_season() {
        let mut runs: Vec<Run> = (0..3).map(|_| run("Mak", 5, 8, true)).collect();
        runs.extend((0..25).map(|_| run("Mak", 0, 0, false)));

        let result = placement_percentages(&runs);

        assert_eq!(result.get(PlacementCategory::Third), 10.71);
        assert_eq!(result.get(PlacementCategory::NoPlacement), 89.29);
        assert_eq!(result.get(PlacementCategory::Second), 0.0);
        assert_eq!(result.get(PlacementCategory::First), 0.0);
        assert_eq!(result.get(PlacementCategory::PerfectGame), 0.0);
    }

    #[test]
    fn test_placement_percentages_order() {
        let result = placement_percentages(&sample_runs());
        // 1 perfect, 1 first, 2 second, 1 third, 1 none out of 6
        assert_eq!(result.percentages, vec![16.67, 16.67, 33.33, 16.67, 16.67]);
    }

    #[test]
    fn test_placement_percentages_gold_policy() {
        let runs = vec![run("Mak", 10, 9, true), run("Mak", 10, 12, true)];
        let standard = placement_percentages(&runs);
        let gold = placement_percentages_with(&runs, TieringPolicy::Gold);

        assert_eq!(standard.get(PlacementCategory::First), 100.0);
        assert_eq!(gold.get(PlacementCategory::First), 50.0);
        assert_eq!(gold.get(PlacementCategory::Second), 50.0);
    }

    #[test]
    fn test_runs_per_hero_collapses_case() {
        let runs = vec![
            run("dooley", 1, 2, true),
            run("DOOLEY", 1, 2, false),
            run("Mak", 1, 2, true),
        ];
        let result = runs_per_hero(&runs);
        assert_eq!(result.heroes, vec!["Dooley", "Mak"]);
        assert_eq!(result.counts, vec![2, 1]);
    }

    #[test]
    fn test_runs_per_hero_empty() {
        let result = runs_per_hero(&[]);
        assert!(result.heroes.is_empty());
        assert!(result.counts.is_empty());
    }

    #[test]
    fn test_hero_share_includes_roster() {
        let share = hero_share(&sample_runs(), &ROSTER);
        assert_eq!(
            share.heroes,
            vec!["Dooley", "Jules", "Karnok", "Mak", "Pygmalien", "Stelle", "Vanessa"]
        );
        assert_eq!(
            share.percentages,
            vec![33.33, 0.0, 16.67, 33.33, 0.0, 0.0, 16.67]
        );
    }

    #[test]
    fn test_hero_share_empty() {
        let share = hero_share(&[], &ROSTER);
        assert_eq!(share.heroes.len(), ROSTER.len());
        assert!(share.percentages.iter().all(|p| *p == 0.0));
    }

    #[test]
    fn test_build_stats_table_empty() {
        let table = build_stats_table(&[], &ROSTER);

        assert_eq!(table.rows.len(), ROSTER.len() + 1);
        assert!(table.rows.iter().all(|r| r.counts.total() == 0));
        assert_eq!(table.rows.last().unwrap().hero, TOTAL_ROW);
        let heroes: Vec<&str> = table.hero_rows().iter().map(|r| r.hero.as_str()).collect();
        assert_eq!(
            heroes,
            vec!["Dooley", "Jules", "Mak", "Pygmalien", "Stelle", "Vanessa"]
        );
    }

    #[test]
    fn test_build_stats_table_counts() {
        let table = build_stats_table(&sample_runs(), &ROSTER);

        let dooley = table.row("Dooley").unwrap();
        assert_eq!(dooley.counts.as_array(), [0, 0, 0, 1, 1]);

        let mak = table.row("Mak").unwrap();
        assert_eq!(mak.counts.as_array(), [0, 1, 1, 0, 0]);

        // Seen but not on the roster
        let karnok = table.row("Karnok").unwrap();
        assert_eq!(karnok.counts.as_array(), [0, 0, 1, 0, 0]);

        assert_eq!(table.row("Jules").unwrap().counts.total(), 0);
        assert_eq!(table.total().unwrap().counts.as_array(), [1, 1, 2, 1, 1]);
    }

    #[test]
    fn test_build_stats_table_total_is_column_sum() {
        let mut runs = sample_runs();
        for wins in 0..=10 {
            runs.push(run("Stelle", wins, 10 + wins % 3, wins % 2 == 0));
        }

        let table = build_stats_table(&runs, &ROSTER);
        let mut sum = CategoryCounts::default();
        for row in table.hero_rows() {
            sum.add(&row.counts);
        }

        assert_eq!(table.total().unwrap().counts, sum);
        assert_eq!(sum.total() as usize, runs.len());
    }

    #[test]
    fn test_build_stats_table_canonicalizes_roster() {
        let table = build_stats_table(&[run("MAK", 4, 4, true)], &["mak"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].hero, "Mak");
        assert_eq!(table.rows[0].counts.third, 1);
    }

    #[test]
    fn test_aggregates_are_idempotent() {
        let runs = sample_runs();
        assert_eq!(placement_percentages(&runs), placement_percentages(&runs));
        assert_eq!(runs_per_hero(&runs), runs_per_hero(&runs));
        assert_eq!(
            build_stats_table(&runs, &ROSTER),
            build_stats_table(&runs, &ROSTER)
        );
        assert_eq!(
            serde_json::to_string(&season_report(0, &runs, &ROSTER, TieringPolicy::Standard))
                .unwrap(),
            serde_json::to_string(&season_report(0, &runs, &ROSTER, TieringPolicy::Standard))
                .unwrap()
        );
    }

    #[test]
    fn test_season_report_partitions_by_ranked() {
        let report = season_report(4, &sample_runs(), &ROSTER, TieringPolicy::Standard);

        assert_eq!(report.season, 4);
        assert_eq!(report.total_runs, 6);

        let ranked = report.ranked.unwrap();
        let unranked = report.unranked.unwrap();
        assert_eq!(ranked.total().unwrap().counts.total(), 3);
        assert_eq!(unranked.total().unwrap().counts.total(), 3);
        assert_eq!(ranked.row("Dooley").unwrap().counts.total(), 2);
        assert_eq!(unranked.row("Dooley").unwrap().counts.total(), 0);
        // Rows come from each partition's own runs plus the roster
        assert!(ranked.row("Karnok").is_none());
        assert!(unranked.row("Karnok").is_some());
    }

    #[test]
    fn test_season_report_empty_suppresses_tables() {
        let report = season_report(1, &[], &ROSTER, TieringPolicy::Standard);
        assert_eq!(report.total_runs, 0);
        assert!(report.ranked.is_none());
        assert!(report.unranked.is_none());
        assert_eq!(report.placements.percentages, vec![0.0; 5]);
    }

    #[test]
    fn test_season_report_uses_one_policy() {
        let runs = vec![run("Mak", 10, 9, true)];
        let report = season_report(0, &runs, &ROSTER, TieringPolicy::Gold);
        assert_eq!(report.tiering, TieringPolicy::Gold);
        assert_eq!(report.placements.get(PlacementCategory::Second), 100.0);
        assert_eq!(
            report.ranked.unwrap().row("Mak").unwrap().counts.second,
            1
        );
    }
}
