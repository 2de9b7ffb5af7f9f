//! Frame and interval scheduling supplied by the host.
//!
//! The core never spins its own loop. It asks a [`FrameScheduler`] for the
//! next frame or for a repeating interval and gets called back with the
//! token it was handed. Cancelled tokens are never delivered, and the
//! orchestrator also ignores any token it no longer expects.

use std::{
    cell::RefCell,
    rc::Rc,
    time::{Duration, Instant},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameToken(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

/// A wake-up the host delivers back to the core.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wake {
    Frame(FrameToken),
    Interval(TimerToken),
}

pub trait FrameScheduler {
    /// Ask for one callback on the next displayed frame.
    fn request_frame(&mut self) -> FrameToken;
    fn cancel_frame(&mut self, token: FrameToken);
    /// Ask for a callback every `period` until cancelled.
    fn start_interval(&mut self, period: Duration) -> TimerToken;
    fn cancel_interval(&mut self, token: TimerToken);
}

#[derive(Debug)]
struct Interval {
    token: TimerToken,
    period: Duration,
    // Set on the first drain after the interval starts.
    next_due: Option<Instant>,
}

#[derive(Debug, Default)]
struct Queue {
    next_id: u64,
    frames: Vec<FrameToken>,
    intervals: Vec<Interval>,
}

impl Queue {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Scheduler backed by a queue the host loop drains once per frame.
///
/// Clones share the same queue: the core owns one handle, the host loop
/// (or a test) keeps another and calls [`drain`](Self::drain).
#[derive(Clone, Debug, Default)]
pub struct QueuedScheduler(Rc<RefCell<Queue>>);

impl QueuedScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every wake-up due at `now`: all requested frames, then elapsed
    /// intervals. Frames requested while handling these land in the next
    /// drain.
    pub fn drain(&self, now: Instant) -> Vec<Wake> {
        let mut queue = self.0.borrow_mut();
        let mut due: Vec<Wake> = queue.frames.drain(..).map(Wake::Frame).collect();
        for interval in &mut queue.intervals {
            match interval.next_due {
                None => interval.next_due = Some(now + interval.period),
                Some(at) if at <= now => {
                    due.push(Wake::Interval(interval.token));
                    // Skip missed periods instead of firing a burst.
                    let next = at + interval.period;
                    interval.next_due = Some(if next <= now { now + interval.period } else { next });
                }
                Some(_) => {}
            }
        }
        due
    }

    /// Number of frames currently requested.
    pub fn pending_frames(&self) -> usize {
        self.0.borrow().frames.len()
    }

    /// Number of running intervals.
    pub fn active_intervals(&self) -> usize {
        self.0.borrow().intervals.len()
    }
}

impl FrameScheduler for QueuedScheduler {
    fn request_frame(&mut self) -> FrameToken {
        let mut queue = self.0.borrow_mut();
        let token = FrameToken(queue.next_id());
        queue.frames.push(token);
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        self.0.borrow_mut().frames.retain(|t| *t != token);
    }

    fn start_interval(&mut self, period: Duration) -> TimerToken {
        let mut queue = self.0.borrow_mut();
        let token = TimerToken(queue.next_id());
        queue.intervals.push(Interval {
            token,
            period,
            next_due: None,
        });
        token
    }

    fn cancel_interval(&mut self, token: TimerToken) {
        self.0.borrow_mut().intervals.retain(|i| i.token != token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_fire_once() {
        let mut sched = QueuedScheduler::new();
        let t0 = Instant::now();
        let token = sched.request_frame();
        assert_eq!(sched.drain(t0), vec![Wake::Frame(token)]);
        assert!(sched.drain(t0).is_empty());
    }

    #[test]
    fn cancelled_frames_never_fire() {
        let mut sched = QueuedScheduler::new();
        let token = sched.request_frame();
        sched.cancel_frame(token);
        assert_eq!(sched.pending_frames(), 0);
        assert!(sched.drain(Instant::now()).is_empty());
    }

    #[test]
    fn intervals_repeat_without_bursts() {
        let mut sched = QueuedScheduler::new();
        let t0 = Instant::now();
        let token = sched.start_interval(Duration::from_secs(2));

        assert!(sched.drain(t0).is_empty());
        assert!(sched.drain(t0 + Duration::from_millis(1999)).is_empty());
        assert_eq!(
            sched.drain(t0 + Duration::from_secs(2)),
            vec![Wake::Interval(token)]
        );
        // A long stall yields one wake-up, not five.
        assert_eq!(sched.drain(t0 + Duration::from_secs(12)).len(), 1);
        assert!(sched.drain(t0 + Duration::from_secs(13)).is_empty());
        assert_eq!(sched.drain(t0 + Duration::from_secs(14)).len(), 1);

        sched.cancel_interval(token);
        assert_eq!(sched.active_intervals(), 0);
        assert!(sched.drain(t0 + Duration::from_secs(60)).is_empty());
    }

    #[test]
    fn clones_share_the_queue() {
        let host = QueuedScheduler::new();
        let mut core = host.clone();
        let token = core.request_frame();
        assert_eq!(host.drain(Instant::now()), vec![Wake::Frame(token)]);
    }
}
