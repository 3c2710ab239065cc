/* =======================================================================
Rustic is a chess playing engine.
Copyright (C) 2019-2024, Marcel Vanthoor
https://rustic-chess.org/

Rustic is written in the Rust programming language. It is an original
work, not derived from any engine that came before it. However, it does
use a lot of concepts which are well-known and are in use by most if not
all classical alpha/beta-based chess engines.

Rustic is free software: you can redistribute it and/or modify it under
the terms of the GNU General Public License version 3 as published by
the Free Software Foundation.

Rustic is distributed in the hope that it will be useful, but WITHOUT
ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License
for more details.

You should have received a copy of the GNU General Public License along
with this program.  If not, see <http://www.gnu.org/licenses/>.
======================================================================= */

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

// Of the remaining clock, one twentieth is spent on the current move;
// the increment is free time on top.
const CLOCK_FRACTION: u128 = 20;

// Default think budget for "go infinite", overridden by the
// MaxSearchTime option (seconds).
pub const DEFAULT_MAX_THINKING_MS: u128 = 5_000;

pub fn allocate_game_time(clock_ms: u128, increment_ms: u128) -> u128 {
    clock_ms / CLOCK_FRACTION + increment_ms
}

// Timed searches are cancelled cooperatively: one detached sleeper
// thread waits out the budget on a channel and raises the stop flag on
// timeout. The search polls the flag at every node entry. When the
// search finishes first it simply drops its end of the channel, which
// wakes the sleeper without setting the flag.
pub struct TimePackage {
    stop: Arc<AtomicBool>,
    pub max_thinking_time: u128,
}

impl TimePackage {
    pub fn new() -> Self {
        Self {
            stop: Arc::new(AtomicBool::new(false)),
            max_thinking_time: DEFAULT_MAX_THINKING_MS,
        }
    }

    pub fn reset(&self) {
        self.stop.store(false, Ordering::Relaxed);
    }

    pub fn stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    pub fn start_sleeper(&self, allocated_ms: u128) -> Sender<()> {
        let stop = Arc::clone(&self.stop);
        let (cancel_tx, cancel_rx) = bounded::<()>(1);

        thread::spawn(move || {
            let wait = Duration::from_millis(allocated_ms.min(u64::MAX as u128) as u64);
            if let Err(RecvTimeoutError::Timeout) = cancel_rx.recv_timeout(wait) {
                stop.store(true, Ordering::Relaxed);
            }
        });

        cancel_tx
    }
}

impl Default for TimePackage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn game_time_allocation_is_a_twentieth_plus_increment() {
        assert_eq!(allocate_game_time(60_000, 0), 3_000);
        assert_eq!(allocate_game_time(60_000, 1_000), 4_000);
        assert_eq!(allocate_game_time(0, 500), 500);
    }

    #[test]
    fn sleeper_sets_the_stop_flag_on_timeout() {
        let pkg = TimePackage::new();
        pkg.reset();
        let _tx = pkg.start_sleeper(10);
        let deadline = Instant::now();
        while !pkg.stopped() {
            assert!(deadline.elapsed().as_millis() < 2_000, "sleeper never fired");
            thread::yield_now();
        }
    }

    #[test]
    fn dropping_the_canceller_does_not_set_the_flag() {
        let pkg = TimePackage::new();
        pkg.reset();
        {
            let tx = pkg.start_sleeper(60_000);
            drop(tx);
        }
        thread::sleep(Duration::from_millis(50));
        assert!(!pkg.stopped());
    }
}
