//! Acquisition Scheduler Implementation

use crate::clock::{Clock, MonotonicClock};
use crate::error::{SchedulerError, TimerError};
use crate::schedule::TickSchedule;
use crate::stats::{TickSnapshot, TickStats};
use adc_protocol::{profile, AdcCodec, BusTransport};
use ring_buffer::SampleRing;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn};

/// Tick period, one sample per period (8 kHz)
pub const TICK_PERIOD: Duration = Duration::from_nanos(profile::PERIOD_NS);

/// Configuration for the acquisition scheduler
///
/// The tick period is not configurable: it is always [`TICK_PERIOD`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Name of the tick thread
    pub thread_name: String,
    /// Spin window before each deadline in microseconds
    pub spin_threshold_us: u64,
    /// SCHED_FIFO priority for the tick thread, `None` keeps the default policy
    pub realtime_priority: Option<i32>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            thread_name: "adc-tick".to_string(),
            spin_threshold_us: 50,
            realtime_priority: None,
        }
    }
}

impl SchedulerConfig {
    /// Build the host clock described by this config
    pub fn clock(&self) -> MonotonicClock {
        MonotonicClock::new(Duration::from_micros(self.spin_threshold_us))
    }
}

/// Acquisition state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcquisitionState {
    /// Timer disarmed (initial state)
    Idle,
    /// Timer armed, one sample per period
    Running,
}

/// Everything one tick touches; owned by the tick thread while running
#[derive(Debug)]
pub struct TickContext<T> {
    codec: AdcCodec<T>,
    ring: Arc<SampleRing>,
    schedule: TickSchedule,
    stats: Arc<TickStats>,
    failure_streak: u64,
}

impl<T: BusTransport> TickContext<T> {
    /// Create a tick context
    pub fn new(
        codec: AdcCodec<T>,
        ring: Arc<SampleRing>,
        schedule: TickSchedule,
        stats: Arc<TickStats>,
    ) -> Self {
        Self {
            codec,
            ring,
            schedule,
            stats,
            failure_streak: 0,
        }
    }

    /// Run one tick: acquire, store on success, and return the next deadline
    ///
    /// A failed bus exchange leaves the ring untouched and never changes
    /// the next deadline.
    pub fn on_tick<C: Clock + ?Sized>(&mut self, clock: &C) -> Instant {
        self.stats.record_tick();

        match self.codec.acquire() {
            Ok(sample) => {
                self.ring.write(sample);
                self.stats.record_sample();
                if self.failure_streak > 0 {
                    debug!("ADC bus recovered after {} dropped samples", self.failure_streak);
                    self.failure_streak = 0;
                }
            }
            Err(e) => {
                self.stats.record_bus_error();
                if self.failure_streak == 0 {
                    warn!("ADC bus transaction failed, dropping samples: {}", e);
                } else {
                    trace!("ADC bus transaction failed: {}", e);
                }
                self.failure_streak += 1;
            }
        }

        let advance = self.schedule.advance(clock.now());
        if advance.overruns > 0 {
            self.stats.record_overruns(advance.overruns);
            trace!("Tick overran {} periods", advance.overruns);
        }
        advance.deadline
    }

    /// Get the deadline of the next tick
    pub fn next_deadline(&self) -> Instant {
        self.schedule.next_deadline()
    }

    /// Release the codec
    pub fn into_codec(self) -> AdcCodec<T> {
        self.codec
    }
}

/// Tick loop: wait for the deadline, tick, re-arm from the returned deadline
fn run_ticks<T: BusTransport, C: Clock>(
    mut ctx: TickContext<T>,
    clock: &C,
    stop: &AtomicBool,
) -> TickContext<T> {
    let mut deadline = ctx.next_deadline();
    loop {
        clock.wait_until(deadline);
        if stop.load(Ordering::Acquire) {
            break;
        }
        deadline = ctx.on_tick(clock);
    }
    ctx
}

#[cfg(target_os = "linux")]
fn set_realtime_priority(priority: i32) -> std::io::Result<()> {
    // SAFETY: sched_param is plain data, zero is a valid bit pattern
    let mut param: libc::sched_param = unsafe { std::mem::zeroed() };
    param.sched_priority = priority;
    // SAFETY: pthread_self() always names the calling thread
    let ret =
        unsafe { libc::pthread_setschedparam(libc::pthread_self(), libc::SCHED_FIFO, &param) };
    if ret != 0 {
        return Err(std::io::Error::from_raw_os_error(ret));
    }
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn set_realtime_priority(_priority: i32) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "realtime priority requires Linux",
    ))
}

struct Worker<T> {
    handle: JoinHandle<Option<AdcCodec<T>>>,
    stop: Arc<AtomicBool>,
}

/// Periodic acquisition engine
///
/// Owns the codec and feeds one sample per period into the shared ring
/// while `Running`. The codec moves into the tick thread on `start()` and
/// comes back on `stop()`.
pub struct AcquisitionScheduler<T, C = MonotonicClock> {
    config: SchedulerConfig,
    period: Duration,
    ring: Arc<SampleRing>,
    clock: Arc<C>,
    stats: Arc<TickStats>,
    state: AcquisitionState,
    codec: Option<AdcCodec<T>>,
    worker: Option<Worker<T>>,
}

impl<T> AcquisitionScheduler<T, MonotonicClock>
where
    T: BusTransport + 'static,
{
    /// Create a scheduler on the host monotonic clock
    pub fn new(codec: AdcCodec<T>, ring: Arc<SampleRing>, config: SchedulerConfig) -> Self {
        let clock = config.clock();
        Self::with_clock(codec, ring, config, clock)
    }
}

impl<T, C> AcquisitionScheduler<T, C>
where
    T: BusTransport + 'static,
    C: Clock,
{
    /// Create a scheduler on a custom clock
    pub fn with_clock(
        codec: AdcCodec<T>,
        ring: Arc<SampleRing>,
        config: SchedulerConfig,
        clock: C,
    ) -> Self {
        info!(
            "Acquisition scheduler created: period {:?}, ring capacity {}",
            TICK_PERIOD,
            ring.capacity()
        );
        Self {
            config,
            period: TICK_PERIOD,
            ring,
            clock: Arc::new(clock),
            stats: Arc::new(TickStats::default()),
            state: AcquisitionState::Idle,
            codec: Some(codec),
            worker: None,
        }
    }

    /// Arm the periodic timer (no-op when already running)
    pub fn start(&mut self) -> Result<(), SchedulerError> {
        if self.state == AcquisitionState::Running {
            debug!("Acquisition already running");
            return Ok(());
        }

        let period = self.period;
        self.clock.check_period(period)?;
        let codec = self.codec.take().ok_or(SchedulerError::CodecLost)?;

        let schedule = TickSchedule::starting_at(self.clock.now(), period);
        let ctx = TickContext::new(
            codec,
            Arc::clone(&self.ring),
            schedule,
            Arc::clone(&self.stats),
        );

        let (ctx_tx, ctx_rx) = mpsc::sync_channel::<TickContext<T>>(1);
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let clock = Arc::clone(&self.clock);
        let priority = self.config.realtime_priority;

        let spawned = std::thread::Builder::new()
            .name(self.config.thread_name.clone())
            .spawn(move || {
                if let Some(priority) = priority {
                    if let Err(e) = set_realtime_priority(priority) {
                        warn!("Could not set SCHED_FIFO priority {}: {}", priority, e);
                    }
                }
                let ctx = ctx_rx.recv().ok()?;
                Some(run_ticks(ctx, &*clock, &thread_stop).into_codec())
            });

        let handle = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                error!("Failed to spawn tick thread: {}", e);
                self.codec = Some(ctx.into_codec());
                return Err(TimerError::Spawn(e.to_string()).into());
            }
        };

        if let Err(mpsc::SendError(ctx)) = ctx_tx.send(ctx) {
            self.codec = Some(ctx.into_codec());
            let _ = handle.join();
            return Err(TimerError::Spawn("tick thread exited before arming".to_string()).into());
        }

        self.worker = Some(Worker { handle, stop });
        self.state = AcquisitionState::Running;
        info!("Acquisition started at {} Hz", profile::SAMPLE_RATE_HZ);
        Ok(())
    }

    /// Get the current write position of the ring
    pub fn position(&self) -> usize {
        self.ring.current_position()
    }

    /// Get the shared ring
    pub fn ring(&self) -> &Arc<SampleRing> {
        &self.ring
    }

    /// Get the codec while idle
    pub fn codec(&self) -> Option<&AdcCodec<T>> {
        self.codec.as_ref()
    }

    /// Get the configuration
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Get the tick period
    pub fn period(&self) -> Duration {
        self.period
    }
}

impl<T, C> AcquisitionScheduler<T, C> {
    /// Disarm the timer (no-op when idle)
    ///
    /// Blocks until the tick thread has exited, so no tick runs after this
    /// returns.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            debug!("Acquisition already idle");
            return;
        };

        info!("Stopping acquisition");
        worker.stop.store(true, Ordering::Release);
        match worker.handle.join() {
            Ok(Some(codec)) => self.codec = Some(codec),
            Ok(None) => error!("Tick thread exited without returning the codec"),
            Err(_) => error!("Tick thread panicked, ADC codec lost"),
        }
        self.state = AcquisitionState::Idle;

        let stats = self.stats.snapshot();
        info!(
            "Acquisition stopped: {} ticks, {} samples, {} bus errors, {} overruns",
            stats.ticks, stats.samples, stats.bus_errors, stats.overruns
        );
    }

    /// Get the current state
    pub fn state(&self) -> AcquisitionState {
        self.state
    }

    /// Check if acquisition is running
    pub fn is_running(&self) -> bool {
        self.state == AcquisitionState::Running
    }

    /// Get tick statistics
    pub fn stats(&self) -> TickSnapshot {
        self.stats.snapshot()
    }
}

impl<T, C> Drop for AcquisitionScheduler<T, C> {
    fn drop(&mut self) {
        self.stop();
    }
}
