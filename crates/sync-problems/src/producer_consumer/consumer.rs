use super::Pipeline;
use async_trait::async_trait;
use rand::rngs::StdRng;
use std::sync::Arc;
use sync_framework::{actor_rng, Actor, Cancelled, Flow, RunState};
use tracing::debug;

/// Takes one item per step. Finishes once the buffer is closed and empty.
#[derive(Debug)]
pub struct Consumer {
    id: usize,
    rng: StdRng,
}

impl Consumer {
    pub fn new(id: usize, seed: Option<u64>) -> Self {
        Self {
            id,
            // Offset so consumer 0 does not share producer 0's delays.
            rng: actor_rng(seed.map(|s| s.wrapping_add(1 << 32)), id),
        }
    }
}

#[async_trait]
impl Actor for Consumer {
    type Context = Pipeline;

    fn id(&self) -> usize {
        self.id
    }

    async fn step(&mut self, pipeline: &Arc<Pipeline>, stop: &RunState) -> Result<Flow, Cancelled> {
        let Some((item, len)) = pipeline.buffer.take(self.id, stop).await? else {
            return Ok(Flow::Finished);
        };
        pipeline.record_consumed();
        debug!(id = self.id, item, len, "Consumed");

        stop.sleep(pipeline.config.consume.sample(&mut self.rng)).await?;
        Ok(Flow::Continue)
    }
}
