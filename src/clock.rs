#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepBatch {
    pub delta_ms: u64,
    pub player_steps: u32,
    pub fast_ghost_steps: u32,
    pub slow_ghost_steps: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationClock {
    player_step_ms: u64,
    fast_ghost_step_ms: u64,
    slow_ghost_step_ms: u64,
    max_frame_delta_ms: u64,
    player_acc: u64,
    fast_ghost_acc: u64,
    slow_ghost_acc: u64,
    last_timestamp_ms: Option<u64>,
}

impl SimulationClock {
    pub fn new(
        player_step_ms: u64,
        fast_ghost_step_ms: u64,
        slow_ghost_step_ms: u64,
        max_frame_delta_ms: u64,
    ) -> Self {
        Self {
            player_step_ms,
            fast_ghost_step_ms,
            slow_ghost_step_ms,
            max_frame_delta_ms,
            player_acc: 0,
            fast_ghost_acc: 0,
            slow_ghost_acc: 0,
            last_timestamp_ms: None,
        }
    }

    pub fn reset(&mut self) {
        self.player_acc = 0;
        self.fast_ghost_acc = 0;
        self.slow_ghost_acc = 0;
        self.last_timestamp_ms = None;
    }

    // The first sample and backwards timestamps yield zero.
    pub fn delta_since_last(&mut self, timestamp_ms: u64) -> u64 {
        let delta = self
            .last_timestamp_ms
            .map(|last| timestamp_ms.saturating_sub(last))
            .unwrap_or(0);
        self.last_timestamp_ms = Some(timestamp_ms);
        delta
    }

    pub fn advance(&mut self, delta_ms: u64) -> StepBatch {
        let delta_ms = delta_ms.min(self.max_frame_delta_ms);
        self.player_acc += delta_ms;
        self.fast_ghost_acc += delta_ms;
        self.slow_ghost_acc += delta_ms;
        StepBatch {
            delta_ms,
            player_steps: drain(&mut self.player_acc, self.player_step_ms),
            fast_ghost_steps: drain(&mut self.fast_ghost_acc, self.fast_ghost_step_ms),
            slow_ghost_steps: drain(&mut self.slow_ghost_acc, self.slow_ghost_step_ms),
        }
    }
}

fn drain(acc: &mut u64, interval: u64) -> u32 {
    if interval == 0 {
        return 0;
    }
    let mut steps = 0;
    while *acc >= interval {
        *acc -= interval;
        steps += 1;
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{
        FAST_GHOST_STEP_MS, MAX_FRAME_DELTA_MS, PLAYER_STEP_MS, SLOW_GHOST_STEP_MS,
    };

    fn reference_clock() -> SimulationClock {
        SimulationClock::new(
            PLAYER_STEP_MS,
            FAST_GHOST_STEP_MS,
            SLOW_GHOST_STEP_MS,
            MAX_FRAME_DELTA_MS,
        )
    }

    #[test]
    fn large_pause_is_clamped() {
        let mut clock = reference_clock();
        let batch = clock.advance(10_000);
        assert_eq!(batch.delta_ms, MAX_FRAME_DELTA_MS);
        assert_eq!(batch.player_steps, 0);
        let batch = clock.advance(10_000);
        assert_eq!(batch.player_steps, 1);
        assert_eq!(batch.fast_ghost_steps, 0);
    }

    #[test]
    fn step_counts_are_independent_of_frame_rate() {
        for frame_ms in [1u64, 7, 16, 17, 33, 50] {
            let mut clock = reference_clock();
            let mut totals = StepBatch::default();
            let mut elapsed = 0;
            while elapsed < 6_640 {
                let batch = clock.advance(frame_ms);
                elapsed += batch.delta_ms;
                totals.player_steps += batch.player_steps;
                totals.fast_ghost_steps += batch.fast_ghost_steps;
                totals.slow_ghost_steps += batch.slow_ghost_steps;
            }
            let expected_player = (elapsed / PLAYER_STEP_MS) as u32;
            assert_eq!(totals.player_steps, expected_player, "frame={frame_ms}");
            assert_eq!(
                totals.fast_ghost_steps,
                (elapsed / FAST_GHOST_STEP_MS) as u32
            );
            assert_eq!(
                totals.slow_ghost_steps,
                (elapsed / SLOW_GHOST_STEP_MS) as u32
            );
        }
    }

    #[test]
    fn small_intervals_catch_up_within_one_tick() {
        let mut clock = SimulationClock::new(10, 20, 50, 50);
        let batch = clock.advance(45);
        assert_eq!(batch.player_steps, 4);
        assert_eq!(batch.fast_ghost_steps, 2);
        assert_eq!(batch.slow_ghost_steps, 0);
        let batch = clock.advance(5);
        assert_eq!(batch.player_steps, 1);
        assert_eq!(batch.fast_ghost_steps, 0);
        assert_eq!(batch.slow_ghost_steps, 1);
    }

    #[test]
    fn timestamps_become_deltas() {
        let mut clock = reference_clock();
        assert_eq!(clock.delta_since_last(1_000), 0);
        assert_eq!(clock.delta_since_last(1_016), 16);
        assert_eq!(clock.delta_since_last(1_010), 0);
        assert_eq!(clock.delta_since_last(1_030), 20);
        clock.reset();
        assert_eq!(clock.delta_since_last(5_000), 0);
    }
}
