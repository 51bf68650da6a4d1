// src/io/reporting.rs

use log::info;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::model::echelon::Echelon;
use crate::simulation::evaluation::EvaluationResult;
use crate::strategy::q_learning::{PolicySnapshot, QTable};
use crate::{Int, Result};

/// One row of a per-strategy time series: one echelon in one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub period: usize,
    pub echelon: Echelon,
    pub inventory: Int,
    pub orders_received: Int,
    /// Chain-wide cost of the period, repeated on each echelon's row.
    pub period_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalCostRecord {
    pub strategy: String,
    pub total_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CumulativeCostRecord {
    pub period: usize,
    pub strategy: String,
    pub cumulative_cost: f64,
}

/// One learned value; state and action use their `(a,b,c,d)` display form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QValueRecord {
    pub state: String,
    pub action: String,
    pub value: f64,
}

/// File-name friendly form of a strategy name, e.g. `1-for-1` -> `1_for_1`.
pub fn strategy_slug(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

/// Flatten an evaluation log into rows, period-major. Periods start at 1.
pub fn log_records(result: &EvaluationResult) -> Vec<LogRecord> {
    let log = &result.log;
    let mut records = Vec::with_capacity(log.len() * Echelon::ALL.len());
    for (t, &period_cost) in log.period_costs.iter().enumerate() {
        for echelon in Echelon::ALL {
            let i = echelon.index();
            records.push(LogRecord {
                period: t + 1,
                echelon,
                inventory: log.inventory_history[i][t],
                orders_received: log.order_history[i][t],
                period_cost,
            });
        }
    }
    records
}

pub fn total_cost_records(results: &[EvaluationResult]) -> Vec<TotalCostRecord> {
    results
        .iter()
        .map(|r| TotalCostRecord {
            strategy: r.strategy.clone(),
            total_cost: r.total_cost,
        })
        .collect()
}

pub fn cumulative_cost_records(results: &[EvaluationResult]) -> Vec<CumulativeCostRecord> {
    let mut records = Vec::new();
    for result in results {
        for (t, cumulative_cost) in result.log.cumulative_costs().into_iter().enumerate() {
            records.push(CumulativeCostRecord {
                period: t + 1,
                strategy: result.strategy.clone(),
                cumulative_cost,
            });
        }
    }
    records
}

pub fn q_value_records(table: &QTable) -> Vec<QValueRecord> {
    table
        .entries()
        .into_iter()
        .map(|(state, action, value)| QValueRecord {
            state: state.to_string(),
            action: action.to_string(),
            value,
        })
        .collect()
}

/// Serialize `records` as CSV with a header row.
pub fn write_records<W: io::Write, T: Serialize>(writer: W, records: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_csv_file<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    write_records(File::create(path)?, records)?;
    info!("Exported {} rows to '{}'", records.len(), path.display());
    Ok(())
}

/// Writes every artifact of a comparison run into `output_dir`:
/// `<strategy>_log.csv` per result, `total_costs.csv`, `cumulative_costs.csv`,
/// and `rlom_policy.json` when a learned policy is given.
///
/// Returns the paths written.
pub fn write_report(
    output_dir: &Path,
    results: &[EvaluationResult],
    policy: Option<&PolicySnapshot>,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)?;
    let mut written = Vec::new();

    for result in results {
        let path = output_dir.join(format!("{}_log.csv", strategy_slug(&result.strategy)));
        write_csv_file(&path, &log_records(result))?;
        written.push(path);
    }

    let path = output_dir.join("total_costs.csv");
    write_csv_file(&path, &total_cost_records(results))?;
    written.push(path);

    let path = output_dir.join("cumulative_costs.csv");
    write_csv_file(&path, &cumulative_cost_records(results))?;
    written.push(path);

    if let Some(policy) = policy {
        let path = output_dir.join("rlom_policy.json");
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, policy)?;
        writer.flush()?;
        info!("Exported {} policy entries to '{}'", policy.len(), path.display());
        written.push(path);
    }

    Ok(written)
}

/// Writes the full value table of the learner to `rlom_q_values.csv`.
pub fn write_q_values(output_dir: &Path, table: &QTable) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join("rlom_q_values.csv");
    write_csv_file(&path, &q_value_records(table))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::coding::CodedState;
    use crate::simulation::engine::SupplyChainEnv;
    use crate::simulation::evaluation::evaluate_strategy;
    use crate::strategy::action::{Action, ActionSpace};
    use crate::strategy::implementations::{FixedAdjustmentPolicy, OneForOnePolicy};

    fn results() -> Vec<EvaluationResult> {
        vec![
            evaluate_strategy(
                &mut SupplyChainEnv::default(),
                &mut FixedAdjustmentPolicy::ga_based(),
            ),
            evaluate_strategy(&mut SupplyChainEnv::default(), &mut OneForOnePolicy::new()),
        ]
    }

    #[test]
    fn test_strategy_slug() {
        assert_eq!(strategy_slug("1-for-1"), "1_for_1");
        assert_eq!(strategy_slug("GA-Based"), "ga_based");
        assert_eq!(strategy_slug("RLOM"), "rlom");
    }

    #[test]
    fn test_log_records_are_period_major() {
        let results = results();
        let records = log_records(&results[1]);
        assert_eq!(records.len(), 35 * 4);
        assert_eq!(records[0].period, 1);
        assert_eq!(records[0].echelon, Echelon::Retailer);
        assert_eq!(records[0].inventory, 1);
        assert_eq!(records[0].orders_received, 15);
        assert_eq!(records[3].echelon, Echelon::Supplier);
        assert_eq!(records[4].period, 2);
        assert!(records.iter().all(|r| r.period_cost >= 0.0));
    }

    #[test]
    fn test_csv_output_has_header_and_rows() {
        let results = results();
        let mut buffer = Vec::new();
        write_records(&mut buffer, &total_cost_records(&results)).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["strategy,total_cost", "GA-Based,11353.0", "1-for-1,55754.0"]);

        let mut buffer = Vec::new();
        write_records(&mut buffer, &log_records(&results[0])[..1]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "period,echelon,inventory,orders_received,period_cost\n1,Retailer,1,15,49.0\n"
        );
    }

    #[test]
    fn test_cumulative_records_end_at_total() {
        let results = results();
        let records = cumulative_cost_records(&results);
        assert_eq!(records.len(), 70);
        let last_ga = records.iter().filter(|r| r.strategy == "GA-Based").last().unwrap();
        assert_eq!(last_ga.period, 35);
        assert_eq!(last_ga.cumulative_cost, 11353.0);
    }

    #[test]
    fn test_q_value_rows_cover_the_action_space() {
        let space = ActionSpace::new(2).unwrap();
        let mut table = QTable::new(space);
        table.get_or_insert(CodedState([4, 7, 7, 7])).set(1, -8.33);

        let records = q_value_records(&table);
        assert_eq!(records.len(), space.size());
        assert_eq!(records[1].state, "(4,7,7,7)");
        assert_eq!(records[1].action, "(0,0,0,1)");
        assert_eq!(records[1].value, -8.33);

        let mut buffer = Vec::new();
        write_records(&mut buffer, &records[..1]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "state,action,value\n\"(4,7,7,7)\",\"(0,0,0,0)\",0.0\n");
    }

    #[test]
    fn test_write_report_creates_all_files() {
        let dir = std::env::temp_dir().join(format!("beer_game_report_{}", std::process::id()));
        let mut policy = PolicySnapshot::default();
        policy.insert(CodedState([7, 7, 7, 7]), Action([1, 0, 0, 0]));

        let written = write_report(&dir, &results(), Some(&policy)).unwrap();

        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "ga_based_log.csv",
                "1_for_1_log.csv",
                "total_costs.csv",
                "cumulative_costs.csv",
                "rlom_policy.json"
            ]
        );
        for path in &written {
            assert!(path.exists());
        }
        let json = fs::read_to_string(dir.join("rlom_policy.json")).unwrap();
        let back: PolicySnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, policy);

        fs::remove_dir_all(&dir).unwrap();
    }
}
