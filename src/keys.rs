//! Fixed key-slot values for the `executions` partition.
//!
//! Every row in a shard partition is addressed by the six-tuple
//! `(type, domain_id, workflow_id, run_id, visibility_ts, task_id)`. Rows
//! that do not key a real execution (task rows, the shard row, the
//! current-execution pointer) fill the non-applicable slots with sentinel
//! UUIDs derived from the row type. The derivation is part of the stored
//! data contract and must stay byte-identical across releases.

use uuid::Uuid;

/// Discriminates which value column of the wide row is populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i64)]
pub enum RowType {
    Shard = 0,
    Execution = 1,
    TransferTask = 2,
    TimerTask = 3,
    ReplicationTask = 4,
    CrossClusterTask = 6,
}

impl RowType {
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(RowType::Shard),
            1 => Some(RowType::Execution),
            2 => Some(RowType::TransferTask),
            3 => Some(RowType::TimerTask),
            4 => Some(RowType::ReplicationTask),
            6 => Some(RowType::CrossClusterTask),
            _ => None,
        }
    }

    pub fn as_i64(self) -> i64 {
        self as i64
    }

    /// Sentinel for the `domain_id` key slot of this row type.
    pub fn domain_sentinel(self) -> Uuid {
        sentinel(1, self)
    }

    /// Sentinel for the `workflow_id` key slot of this row type.
    pub fn workflow_sentinel(self) -> Uuid {
        sentinel(2, self)
    }

    /// Sentinel for the `run_id` key slot of this row type.
    pub fn run_sentinel(self) -> Uuid {
        sentinel(3, self)
    }
}

/// Sentinels follow `E0000000-R000-f000-f000-000000000000` where `E` is the
/// key slot (domain = 1, workflow = 2, run = 3) and `R` is the row type
/// shifted by one so that the all-zero group stays free for the distinguished
/// run ids below.
fn sentinel(entity: u32, row_type: RowType) -> Uuid {
    let slot = (row_type.as_i64() as u16 + 1) << 12;
    Uuid::from_fields(
        entity << 28,
        slot,
        0xf000,
        &[0xf0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
    )
}

/// Substituted wherever a run-id string is empty in a key position.
pub const EMPTY_RUN_ID: &str = "30000000-0000-f000-f000-000000000000";

/// Keys the current-execution pointer row of a `(domain, workflow)`.
pub const PERMANENT_RUN_ID: &str = "30000000-0000-f000-f000-000000000001";

/// Target slots of transfer tasks that address a workflow rather than a run.
pub const TRANSFER_TARGET_WORKFLOW_ID: &str = "20000000-0000-f000-f000-000000000001";
pub const TRANSFER_TARGET_RUN_ID: &str = "30000000-0000-f000-f000-000000000002";

/// `visibility_ts` of every non-timer row: 2000-01-01T00:00:00Z in epoch ms.
pub const DEFAULT_VISIBILITY_TIMESTAMP_MS: i64 = 946_684_800_000;

/// `task_id` slot of the execution row and the current-execution pointer.
pub const EXECUTION_ROW_TASK_ID: i64 = -10;

/// `task_id` slot of the shard row.
pub const SHARD_ROW_TASK_ID: i64 = -11;

pub fn run_id_or_empty_sentinel(run_id: &str) -> &str {
    if run_id.is_empty() { EMPTY_RUN_ID } else { run_id }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_formula_is_stable() {
        assert_eq!(
            RowType::TimerTask.domain_sentinel().to_string(),
            "10000000-4000-f000-f000-000000000000"
        );
        assert_eq!(
            RowType::TimerTask.workflow_sentinel().to_string(),
            "20000000-4000-f000-f000-000000000000"
        );
        assert_eq!(
            RowType::TimerTask.run_sentinel().to_string(),
            "30000000-4000-f000-f000-000000000000"
        );
        assert_eq!(
            RowType::TransferTask.domain_sentinel().to_string(),
            "10000000-3000-f000-f000-000000000000"
        );
        assert_eq!(
            RowType::ReplicationTask.domain_sentinel().to_string(),
            "10000000-5000-f000-f000-000000000000"
        );
        assert_eq!(
            RowType::CrossClusterTask.domain_sentinel().to_string(),
            "10000000-7000-f000-f000-000000000000"
        );
        assert_eq!(
            RowType::Shard.run_sentinel().to_string(),
            "30000000-1000-f000-f000-000000000000"
        );
    }

    #[test]
    fn sentinel_derivation_is_total_and_repeatable() {
        for row_type in [
            RowType::Shard,
            RowType::Execution,
            RowType::TransferTask,
            RowType::TimerTask,
            RowType::ReplicationTask,
            RowType::CrossClusterTask,
        ] {
            assert_eq!(row_type.domain_sentinel(), row_type.domain_sentinel());
            assert_eq!(row_type.workflow_sentinel(), row_type.workflow_sentinel());
            assert_eq!(row_type.run_sentinel(), row_type.run_sentinel());
        }
    }

    #[test]
    fn row_type_round_trips_through_i64() {
        assert_eq!(RowType::from_i64(3), Some(RowType::TimerTask));
        assert_eq!(RowType::from_i64(6), Some(RowType::CrossClusterTask));
        assert_eq!(RowType::from_i64(5), None);
        assert_eq!(RowType::CrossClusterTask.as_i64(), 6);
    }

    #[test]
    fn empty_run_id_is_substituted() {
        assert_eq!(run_id_or_empty_sentinel(""), EMPTY_RUN_ID);
        assert_eq!(run_id_or_empty_sentinel("runid1"), "runid1");
    }
}
