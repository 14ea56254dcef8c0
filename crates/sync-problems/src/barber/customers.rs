//! Customers: one short-lived task per visit, plus the actor that keeps sending them.

use super::{Admission, BarberEvent, BarberShop};
use async_trait::async_trait;
use rand::rngs::StdRng;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use sync_framework::{actor_rng, Actor, Cancelled, DelayRange, Flow, RunState};
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// One customer's visit.
///
/// Balking never blocks. A seated customer waits on `barber_ready` until the barber
/// calls it or `stop` fires.
pub async fn customer_arrives(shop: Arc<BarberShop>, customer: u64, stop: RunState) -> Admission {
    if !stop.is_running() {
        return Admission::Cancelled;
    }

    {
        let mut free = shop.seats();
        if *free == 0 {
            shop.balked.fetch_add(1, Ordering::Relaxed);
            shop.probe.emit(BarberEvent::Balked { customer });
            warn!(customer, "Waiting room full, customer left");
            return Admission::Balked;
        }
        *free -= 1;
        shop.seated.fetch_add(1, Ordering::Relaxed);
        shop.probe.emit(BarberEvent::SeatTaken {
            customer,
            free_seats: *free,
        });
        debug!(customer, free_seats = *free, "Seat taken");
    }

    shop.customer_ready.signal();
    match shop.barber_ready.wait(&stop).await {
        Ok(()) => {
            debug!(customer, "Called to the chair");
            Admission::Granted
        }
        Err(Cancelled) => Admission::Cancelled,
    }
}

/// Sends a new customer into the shop after every arrival interval.
///
/// Each visit runs on its own task so a waiting customer never delays the next
/// arrival. Finished visits are reaped as the generator goes.
#[derive(Debug)]
pub struct CustomerGenerator {
    arrivals: DelayRange,
    rng: StdRng,
    next_customer: u64,
    visits: JoinSet<Admission>,
}

impl CustomerGenerator {
    pub fn new(arrivals: DelayRange, seed: Option<u64>) -> Self {
        Self {
            arrivals,
            rng: actor_rng(seed, 1),
            next_customer: 0,
            visits: JoinSet::new(),
        }
    }
}

#[async_trait]
impl Actor for CustomerGenerator {
    type Context = BarberShop;

    fn id(&self) -> usize {
        0
    }

    async fn step(&mut self, shop: &Arc<BarberShop>, stop: &RunState) -> Result<Flow, Cancelled> {
        stop.sleep(self.arrivals.sample(&mut self.rng)).await?;

        while self.visits.try_join_next().is_some() {}

        let customer = self.next_customer;
        self.next_customer += 1;
        self.visits
            .spawn(customer_arrives(shop.clone(), customer, stop.clone()));
        Ok(Flow::Continue)
    }

    async fn on_stop(&mut self, _shop: &Arc<BarberShop>) {
        let mut cancelled = 0u64;
        while let Some(visit) = self.visits.join_next().await {
            if matches!(visit, Ok(Admission::Cancelled)) {
                cancelled += 1;
            }
        }
        debug!(customers = self.next_customer, cancelled, "Customer generator drained");
    }
}
