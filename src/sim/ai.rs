//! Tick-windowed reconciliation between the scheduler and the AI pool
//!
//! A request submitted for AI tick `T` is consumed while simulating tick
//! `T + 1`. If the pool has not delivered by then, the intents are
//! recomputed inline from the stored request, so the pool only ever changes
//! latency, never the outcome.

use std::collections::BTreeMap;

use super::state::SimState;
use super::tick::IntentMap;
use crate::jobs::{EnemySnapshot, IntentPool, IntentRequest, IntentResult, compute_intents};

/// Requests and results older than this many AI ticks are pruned
pub const AI_HORIZON: u64 = 8;

pub struct AiPipeline {
    pool: Option<IntentPool>,
    workers: usize,
    queue_depth: usize,
    ai_tick: u64,
    pending: BTreeMap<u64, IntentRequest>,
    ready: BTreeMap<u64, IntentResult>,
}

impl AiPipeline {
    /// `workers == 0` runs without a pool; every tick takes the inline path
    pub fn new(workers: usize, queue_depth: usize) -> Self {
        Self {
            pool: spawn_pool(workers, queue_depth),
            workers,
            queue_depth,
            ai_tick: 0,
            pending: BTreeMap::new(),
            ready: BTreeMap::new(),
        }
    }

    pub fn ai_tick(&self) -> u64 {
        self.ai_tick
    }

    pub fn has_pool(&self) -> bool {
        self.pool.is_some()
    }

    /// Close the pool, start a fresh one and forget every in-flight request
    pub fn reset(&mut self, ai_tick: u64) {
        if let Some(mut pool) = self.pool.take() {
            pool.close();
        }
        self.pool = spawn_pool(self.workers, self.queue_depth);
        self.ai_tick = ai_tick;
        self.pending.clear();
        self.ready.clear();
    }

    /// Stop using worker threads from now on
    pub fn disable_workers(&mut self) {
        if let Some(mut pool) = self.pool.take() {
            pool.close();
        }
        self.workers = 0;
        self.ready.clear();
    }

    /// Move delivered results into the ready table, dropping stale ones
    pub fn drain(&mut self) {
        let Some(pool) = &self.pool else {
            return;
        };
        for res in pool.drain() {
            if res.tick + 1 < self.ai_tick {
                log::debug!(
                    "discarding stale AI result for tick {} (now {})",
                    res.tick,
                    self.ai_tick
                );
                continue;
            }
            self.ready.insert(res.tick, res);
        }
    }

    /// Advance the AI tick and return the intents for the previous window
    pub fn advance(&mut self) -> IntentMap {
        self.ai_tick += 1;
        self.consume(self.ai_tick - 1)
    }

    /// Intents for `tick`: the delivered result if present, otherwise a
    /// synchronous recompute of the exact request that was submitted
    pub fn consume(&mut self, tick: u64) -> IntentMap {
        let pending = self.pending.remove(&tick);
        let result = match (self.ready.remove(&tick), pending) {
            (Some(res), _) => res,
            (None, Some(req)) => compute_intents(&req),
            (None, None) => return IntentMap::new(),
        };
        result
            .intents
            .into_iter()
            .map(|intent| (intent.enemy_id, intent))
            .collect()
    }

    /// Record the request for the current AI tick and offer it to the pool
    pub fn submit(&mut self, state: &SimState) {
        let Some(req) = build_request(self.ai_tick, state) else {
            return;
        };
        if let Some(pool) = &self.pool {
            // Full queue is fine: consume() falls back to the stored copy
            pool.submit(req.clone());
        }
        self.pending.insert(req.tick, req);
    }

    /// Put back a request captured by a snapshot, exactly as it was submitted
    pub fn restore_pending(&mut self, req: IntentRequest) {
        if let Some(pool) = &self.pool {
            pool.submit(req.clone());
        }
        self.pending.insert(req.tick, req);
    }

    /// Drop table entries older than the horizon
    pub fn prune(&mut self) {
        if self.ai_tick <= AI_HORIZON {
            return;
        }
        let cutoff = self.ai_tick - AI_HORIZON;
        self.pending = self.pending.split_off(&cutoff);
        self.ready = self.ready.split_off(&cutoff);
    }

    pub fn pending_request(&self, tick: u64) -> Option<&IntentRequest> {
        self.pending.get(&tick)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn ready_len(&self) -> usize {
        self.ready.len()
    }

    /// Test hook: pretend the pool delivered `res`
    #[cfg(test)]
    pub(crate) fn insert_ready(&mut self, res: IntentResult) {
        self.ready.insert(res.tick, res);
    }
}

fn spawn_pool(workers: usize, queue_depth: usize) -> Option<IntentPool> {
    if workers == 0 {
        return None;
    }
    let pool = IntentPool::new(workers, queue_depth);
    // Every spawn failed; run synchronously
    if pool.is_closed() { None } else { Some(pool) }
}

/// Copy what the AI needs out of the live state. `None` when there are no enemies.
pub fn build_request(tick: u64, state: &SimState) -> Option<IntentRequest> {
    if state.enemies.is_empty() {
        return None;
    }
    Some(IntentRequest {
        tick,
        player_pos: state.player.pos,
        enemies: state
            .enemies
            .iter()
            .map(|e| EnemySnapshot {
                enemy_id: e.id,
                role: e.kind.role(),
                pos: e.pos,
                radius: e.radius,
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::{EnemyIntent, IntentMode};
    use crate::sim::state::{Enemy, EnemyKind};
    use crate::tuning::Config;
    use glam::Vec2;

    fn state_with_enemy() -> SimState {
        let mut s = SimState::new(2000.0, 2000.0, Config::default(), 1);
        let id = s.next_enemy_id();
        let pos = s.player.pos + Vec2::new(-150.0, 0.0);
        s.enemies.push(Enemy::new(id, EnemyKind::Runner, pos, &s.config));
        s
    }

    #[test]
    fn test_fallback_recomputes_submitted_request() {
        let mut ai = AiPipeline::new(0, 4);
        let mut s = state_with_enemy();
        ai.submit(&s);
        let req = ai.pending_request(0).cloned().unwrap();

        // Live state moves on; the fallback must not look at it
        s.enemies[0].pos = Vec2::new(5.0, 5.0);
        s.player.pos = Vec2::new(1500.0, 40.0);

        let got = ai.advance();
        let want = compute_intents(&req);
        assert_eq!(got.len(), 1);
        let intent = got[&want.intents[0].enemy_id];
        assert!((intent.dir - want.intents[0].dir).length() < 1e-4);
        assert_eq!(intent.mode, want.intents[0].mode);
        assert_eq!(ai.pending_len(), 0);
    }

    #[test]
    fn test_ready_result_wins_over_fallback() {
        let mut ai = AiPipeline::new(0, 4);
        let s = state_with_enemy();
        ai.submit(&s);
        ai.insert_ready(IntentResult {
            tick: 0,
            intents: vec![EnemyIntent {
                enemy_id: 1,
                dir: Vec2::X,
                speed_scale: 1.0,
                preferred_range: 0.0,
                mode: IntentMode::Pursue,
            }],
        });
        let got = ai.advance();
        assert_eq!(got[&1].dir, Vec2::X);
        assert_eq!(ai.ready_len(), 0);
        assert_eq!(ai.pending_len(), 0);
    }

    #[test]
    fn test_no_enemies_means_no_request() {
        let mut ai = AiPipeline::new(0, 4);
        let s = SimState::new(100.0, 100.0, Config::default(), 1);
        ai.submit(&s);
        assert_eq!(ai.pending_len(), 0);
        assert!(ai.advance().is_empty());
    }

    #[test]
    fn test_prune_keeps_horizon() {
        let mut ai = AiPipeline::new(0, 4);
        let s = state_with_enemy();
        for _ in 0..20 {
            ai.submit(&s);
            ai.ai_tick += 1;
        }
        ai.prune();
        assert_eq!(ai.ai_tick(), 20);
        assert_eq!(ai.pending_len(), 8);
        assert!(ai.pending_request(11).is_none());
        assert!(ai.pending_request(12).is_some());
    }

    #[test]
    fn test_pool_results_match_inline() {
        let mut ai = AiPipeline::new(2, 8);
        assert!(ai.has_pool());
        let s = state_with_enemy();
        ai.submit(&s);
        let want = compute_intents(ai.pending_request(0).unwrap());

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while ai.ready_len() == 0 && std::time::Instant::now() < deadline {
            ai.drain();
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
        let got = ai.advance();
        assert_eq!(got[&1], want.intents[0]);
    }

    #[test]
    fn test_reset_clears_tables() {
        let mut ai = AiPipeline::new(1, 4);
        let s = state_with_enemy();
        ai.submit(&s);
        ai.ai_tick = 7;
        ai.reset(0);
        assert_eq!(ai.ai_tick(), 0);
        assert_eq!(ai.pending_len(), 0);
        assert!(ai.has_pool());
    }
}
