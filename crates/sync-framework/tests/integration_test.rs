use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use sync_framework::{Actor, ActorGroup, Cancelled, CoordError, EngineHandle, Flow, RunState, Semaphore};

// --- Test Engine: two actors passing a ball through a pair of semaphores ---

#[derive(Debug)]
struct Court {
    ping_turn: Semaphore,
    pong_turn: Semaphore,
    pings: AtomicU64,
    pongs: AtomicU64,
}

impl Court {
    fn new() -> Self {
        Self {
            ping_turn: Semaphore::new(1),
            pong_turn: Semaphore::new(0),
            pings: AtomicU64::new(0),
            pongs: AtomicU64::new(0),
        }
    }
}

struct Player {
    id: usize,
}

#[async_trait]
impl Actor for Player {
    type Context = Court;

    fn id(&self) -> usize {
        self.id
    }

    async fn step(&mut self, court: &Arc<Court>, stop: &RunState) -> Result<Flow, Cancelled> {
        let (mine, theirs, hits) = if self.id == 0 {
            (&court.ping_turn, &court.pong_turn, &court.pings)
        } else {
            (&court.pong_turn, &court.ping_turn, &court.pongs)
        };
        mine.wait(stop).await?;
        hits.fetch_add(1, Ordering::SeqCst);
        stop.sleep(Duration::from_millis(1)).await?;
        theirs.signal();
        Ok(Flow::Continue)
    }
}

struct Rally {
    group: ActorGroup,
    court: Arc<Court>,
}

#[async_trait]
impl EngineHandle for Rally {
    type Report = (u64, u64);

    fn name(&self) -> &'static str {
        "rally"
    }

    fn stop_signal(&self) -> RunState {
        self.group.state().clone()
    }

    async fn join(self) -> Result<(u64, u64), CoordError> {
        self.group.join().await?;
        Ok((
            self.court.pings.load(Ordering::SeqCst),
            self.court.pongs.load(Ordering::SeqCst),
        ))
    }
}

fn start_rally() -> Rally {
    let court = Arc::new(Court::new());
    let mut group = ActorGroup::new("rally");
    group.spawn(Player { id: 0 }, court.clone());
    group.spawn(Player { id: 1 }, court.clone());
    Rally { group, court }
}

#[tokio::test]
async fn test_framework_full_lifecycle() {
    let rally = start_rally();

    tokio::time::sleep(Duration::from_millis(50)).await;
    let (pings, pongs) = rally.shutdown(Duration::from_secs(1)).await.unwrap();

    assert!(pings > 1);
    // Strict alternation: ping always leads by at most one hit.
    assert!(pings == pongs || pings == pongs + 1, "pings={pings} pongs={pongs}");
}

#[tokio::test]
async fn test_stop_from_another_task() {
    let rally = start_rally();
    let stop = rally.stop_signal();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        stop.stop();
    });

    // join alone would wait forever; the cloned signal ends it.
    let result = tokio::time::timeout(Duration::from_secs(1), rally.join()).await;
    assert!(result.expect("rally should stop").is_ok());
}

// --- An actor parked on a wait that ignores the stop signal ---

struct Stuck {
    entered: Arc<AtomicU64>,
}

#[async_trait]
impl Actor for Stuck {
    type Context = tokio::sync::Mutex<()>;

    fn id(&self) -> usize {
        0
    }

    async fn step(&mut self, lock: &Arc<tokio::sync::Mutex<()>>, _: &RunState) -> Result<Flow, Cancelled> {
        self.entered.fetch_add(1, Ordering::SeqCst);
        let _guard = lock.lock().await;
        Ok(Flow::Continue)
    }
}

struct Jammed {
    group: ActorGroup,
}

#[async_trait]
impl EngineHandle for Jammed {
    type Report = ();

    fn name(&self) -> &'static str {
        "jammed"
    }

    fn stop_signal(&self) -> RunState {
        self.group.state().clone()
    }

    async fn join(self) -> Result<(), CoordError> {
        self.group.join().await
    }
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_times_out_on_uncancellable_wait() {
    let lock = Arc::new(tokio::sync::Mutex::new(()));
    let held = lock.clone().lock_owned().await;
    let entered = Arc::new(AtomicU64::new(0));

    let mut group = ActorGroup::new("jammed");
    group.spawn(Stuck { entered: entered.clone() }, lock.clone());
    let jammed = Jammed { group };

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(entered.load(Ordering::SeqCst), 1);

    let err = jammed.shutdown(Duration::from_millis(100)).await.unwrap_err();
    assert!(matches!(
        err,
        CoordError::ShutdownTimedOut { engine: "jammed", grace } if grace == Duration::from_millis(100)
    ));

    // Timing out dropped the group, which aborted the stuck task and released its
    // claim on the lock.
    drop(held);
    tokio::task::yield_now().await;
    assert!(lock.try_lock().is_ok());
}
