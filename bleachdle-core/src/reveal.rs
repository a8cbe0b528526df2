use serde::Serialize;
use std::time::Duration;

/// Gap between two consecutive cell reveals of the same row
pub const DEFAULT_REVEAL_STAGGER: Duration = Duration::from_millis(500);

/// Length of the opacity transition once a cell is revealed
pub const FADE_DURATION: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RowId(pub u64);

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row-{}", self.0)
    }
}

/// `(delay, cell)` pair; the delay is relative to the row's insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealStep {
    pub delay: Duration,
    pub cell: usize,
}

/// Ordered reveal plan for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealSchedule {
    steps: Vec<RevealStep>,
}

impl RevealSchedule {
    /// Cell `i` is revealed `i * stagger` after insertion, left to right.
    pub fn staggered(cell_count: usize, stagger: Duration) -> Self {
        let steps = (0..cell_count)
            .map(|cell| RevealStep {
                delay: stagger * cell as u32,
                cell,
            })
            .collect();
        Self { steps }
    }

    pub fn steps(&self) -> &[RevealStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Delay of the last reveal
    pub fn span(&self) -> Duration {
        self.steps.last().map(|s| s.delay).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealTarget {
    pub row: RowId,
    pub cell: usize,
}

#[derive(Debug, Clone, Copy)]
struct PendingReveal {
    due_at: Duration,
    target: RevealTarget,
}

/// Single queue for every row's reveals.
///
/// Rows are independent: schedules of rapid consecutive guesses interleave
/// freely.
#[derive(Debug, Default)]
pub struct RevealScheduler {
    pending: Vec<PendingReveal>,
}

impl RevealScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, row: RowId, inserted_at: Duration, schedule: &RevealSchedule) {
        for step in schedule.steps() {
            let due_at = inserted_at + step.delay;
            // Keep the queue ordered by due time; ties stay in scheduling order
            let index = self.pending.partition_point(|p| p.due_at <= due_at);
            self.pending.insert(
                index,
                PendingReveal {
                    due_at,
                    target: RevealTarget { row, cell: step.cell },
                },
            );
        }
    }

    /// Remove and return every reveal due at or before `now`, in due order.
    pub fn drain_due(&mut self, now: Duration) -> Vec<RevealTarget> {
        let due = self.pending.partition_point(|p| p.due_at <= now);
        self.pending.drain(..due).map(|p| p.target).collect()
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.pending.first().map(|p| p.due_at)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_staggered_schedule() {
        let schedule = RevealSchedule::staggered(4, DEFAULT_REVEAL_STAGGER);
        let delays: Vec<u64> = schedule
            .steps()
            .iter()
            .map(|s| s.delay.as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![0, 500, 1000, 1500]);
        assert_eq!(schedule.span(), ms(1500));

        let cells: Vec<usize> = schedule.steps().iter().map(|s| s.cell).collect();
        assert_eq!(cells, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_empty_schedule() {
        let schedule = RevealSchedule::staggered(0, DEFAULT_REVEAL_STAGGER);
        assert!(schedule.is_empty());
        assert_eq!(schedule.span(), Duration::ZERO);
    }

    #[test]
    fn test_drain_follows_virtual_time() {
        let mut scheduler = RevealScheduler::new();
        scheduler.schedule(RowId(1), ms(100), &RevealSchedule::staggered(3, ms(500)));

        assert_eq!(scheduler.drain_due(ms(99)), vec![]);
        assert_eq!(
            scheduler.drain_due(ms(100)),
            vec![RevealTarget { row: RowId(1), cell: 0 }]
        );
        assert_eq!(scheduler.next_due(), Some(ms(600)));
        assert_eq!(
            scheduler.drain_due(ms(5000)),
            vec![
                RevealTarget { row: RowId(1), cell: 1 },
                RevealTarget { row: RowId(1), cell: 2 }
            ]
        );
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_overlapping_rows_interleave() {
        let mut scheduler = RevealScheduler::new();
        scheduler.schedule(RowId(1), ms(0), &RevealSchedule::staggered(3, ms(500)));
        scheduler.schedule(RowId(2), ms(250), &RevealSchedule::staggered(2, ms(500)));
        assert_eq!(scheduler.pending_len(), 5);

        let order: Vec<(u64, usize)> = scheduler
            .drain_due(ms(10_000))
            .into_iter()
            .map(|t| (t.row.0, t.cell))
            .collect();
        assert_eq!(order, vec![(1, 0), (2, 0), (1, 1), (2, 1), (1, 2)]);
    }

    #[test]
    fn test_ties_keep_scheduling_order() {
        let mut scheduler = RevealScheduler::new();
        scheduler.schedule(RowId(1), ms(500), &RevealSchedule::staggered(1, ms(500)));
        scheduler.schedule(RowId(2), ms(0), &RevealSchedule::staggered(2, ms(500)));

        let order: Vec<u64> = scheduler
            .drain_due(ms(500))
            .into_iter()
            .map(|t| t.row.0)
            .collect();
        assert_eq!(order, vec![2, 1, 2]);
    }
}
