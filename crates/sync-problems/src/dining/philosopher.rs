use super::{DiningEvent, Strategy, Table};
use async_trait::async_trait;
use rand::rngs::StdRng;
use std::sync::Arc;
use sync_framework::{actor_rng, Actor, Cancelled, Flow, RunState};
use tracing::debug;

/// One seat at the table.
///
/// Fork `id` is this philosopher's left fork and fork `id + 1 (mod N)` its right.
#[derive(Debug)]
pub struct Philosopher {
    id: usize,
    strategy: Strategy,
    rng: StdRng,
}

impl Philosopher {
    pub fn new(id: usize, strategy: Strategy, seed: Option<u64>) -> Self {
        Self {
            id,
            strategy,
            rng: actor_rng(seed, id),
        }
    }

    /// Indices of the (first, second) fork to pick up at a table of `seats`.
    pub fn acquisition_order(&self, seats: usize) -> (usize, usize) {
        let left = self.id;
        let right = (self.id + 1) % seats;
        match self.strategy {
            Strategy::Unordered => (left, right),
            Strategy::ParityOrdered if self.id % 2 == 0 => (left, right),
            Strategy::ParityOrdered => (right, left),
        }
    }
}

#[async_trait]
impl Actor for Philosopher {
    type Context = Table;

    fn id(&self) -> usize {
        self.id
    }

    async fn step(&mut self, table: &Arc<Table>, stop: &RunState) -> Result<Flow, Cancelled> {
        let id = self.id;
        let config = table.config();
        let probe = table.probe();

        let think = config.think.sample(&mut self.rng);
        debug!(id, ms = think.as_millis() as u64, "Thinking");
        probe.emit(DiningEvent::Thinking { philosopher: id });
        stop.sleep(think).await?;

        let (first, second) = self.acquisition_order(table.seats());
        let _first = table.fork(first).pick_up(id, probe).await;
        debug!(id, fork = first, position = "first", "Fork acquired");

        stop.sleep(config.fork_gap.sample(&mut self.rng)).await?;

        let _second = table.fork(second).pick_up(id, probe).await;
        debug!(id, fork = second, position = "second", "Fork acquired");

        let eat = config.eat.sample(&mut self.rng);
        debug!(id, ms = eat.as_millis() as u64, "Eating");
        probe.emit(DiningEvent::Eating { philosopher: id });
        stop.sleep(eat).await?;
        table.record_meal(id);

        Ok(Flow::Continue)
    }
}
