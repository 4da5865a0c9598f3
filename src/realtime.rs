//! Real-time pacing of the simulator.
//!
//! The discrete-event [`Simulator`] jumps from one event to the next.  Here
//! each event waits on the tokio clock until its simulated time (one time unit
//! is one millisecond), so a run can be watched as it happens.  Handlers still
//! run to completion between awaits; the runtime is only used for sleeping.
//!
//! The future borrows the simulator, so a caller can race it against Ctrl-C
//! and still call [`Simulator::finish`] afterwards.

use tokio::time::{sleep_until, Instant};

use crate::simulator::Simulator;

/// Drive `sim` until it has nothing left to do.
pub async fn run(sim: &mut Simulator) {
    let start = Instant::now() - sim.now();
    while let Some(at) = sim.next_event_time() {
        sleep_until(start + at).await;
        if !sim.step() {
            break;
        }
    }
}
