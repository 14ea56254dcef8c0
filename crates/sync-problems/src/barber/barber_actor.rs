use super::{BarberEvent, BarberShop};
use async_trait::async_trait;
use rand::rngs::StdRng;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use sync_framework::{actor_rng, Actor, Cancelled, Flow, RunState};
use tracing::debug;

/// The shop's only worker. Sleeps on `customer_ready` whenever the room is empty.
#[derive(Debug)]
pub struct Barber {
    rng: StdRng,
}

impl Barber {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: actor_rng(seed, 0),
        }
    }
}

#[async_trait]
impl Actor for Barber {
    type Context = BarberShop;

    fn id(&self) -> usize {
        0
    }

    async fn step(&mut self, shop: &Arc<BarberShop>, stop: &RunState) -> Result<Flow, Cancelled> {
        shop.customer_ready.wait(stop).await?;

        {
            let mut free = shop.seats();
            *free += 1;
            assert!(
                *free <= shop.waiting_chairs,
                "free seats {} exceed waiting chairs {}",
                *free,
                shop.waiting_chairs
            );
            shop.probe.emit(BarberEvent::SeatFreed { free_seats: *free });
            debug!(free_seats = *free, "Seat freed");
        }

        shop.barber_ready.signal();
        shop.probe.emit(BarberEvent::ServiceStarted);

        let haircut = shop.config.haircut.sample(&mut self.rng);
        debug!(ms = haircut.as_millis() as u64, "Cutting hair");
        stop.sleep(haircut).await?;

        shop.haircuts.fetch_add(1, Ordering::Relaxed);
        shop.probe.emit(BarberEvent::ServiceFinished);
        Ok(Flow::Continue)
    }
}
