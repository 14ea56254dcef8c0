use super::Pipeline;
use async_trait::async_trait;
use rand::rngs::StdRng;
use std::sync::Arc;
use sync_framework::{actor_rng, Actor, Cancelled, Flow, RunState};
use tracing::debug;

/// Makes one item per step and puts it into the shared buffer.
///
/// Items are numbered `id * 1000 + sequence`, so every item names its producer.
#[derive(Debug)]
pub struct Producer {
    id: usize,
    sequence: u64,
    rng: StdRng,
}

impl Producer {
    pub fn new(id: usize, seed: Option<u64>) -> Self {
        Self {
            id,
            sequence: 0,
            rng: actor_rng(seed, id),
        }
    }

    fn next_item(&mut self) -> u64 {
        let item = self.id as u64 * 1000 + self.sequence;
        self.sequence += 1;
        item
    }
}

#[async_trait]
impl Actor for Producer {
    type Context = Pipeline;

    fn id(&self) -> usize {
        self.id
    }

    async fn step(&mut self, pipeline: &Arc<Pipeline>, stop: &RunState) -> Result<Flow, Cancelled> {
        let item = self.next_item();
        stop.sleep(pipeline.config.produce.sample(&mut self.rng)).await?;

        let len = pipeline.buffer.put(self.id, item, stop).await?;
        pipeline.record_produced();
        debug!(id = self.id, item, len, "Produced");
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_carry_producer_id() {
        let mut producer = Producer::new(2, Some(0));
        assert_eq!(producer.next_item(), 2000);
        assert_eq!(producer.next_item(), 2001);
    }
}
