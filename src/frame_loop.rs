//! Cancellable repeating frame task.
//!
//! Stands in for the display-refresh callback: a dedicated thread runs the
//! frame closure at a fixed rate until stopped. Errors returned by a frame
//! are caught here, at the loop boundary, and handled by policy.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::DrawError;
use crate::params::FrameErrorPolicy;

/// How a frame loop ended
#[derive(Debug, Clone, PartialEq)]
pub enum FrameLoopExit {
    /// Cancelled through `stop()`
    Stopped { frames: u64, skipped: u64 },

    /// Ended by a failed frame under `FrameErrorPolicy::Halt`
    Halted { frames: u64, error: DrawError },
}

/// Handle to a running frame loop
pub struct FrameLoop {
    cancel: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<FrameLoopExit>>,
}

impl FrameLoop {
    /// Run `frame` every `interval` on its own thread until stopped
    pub fn spawn<F>(interval: Duration, policy: FrameErrorPolicy, mut frame: F) -> Self
    where
        F: FnMut() -> Result<(), DrawError> + Send + 'static,
    {
        let cancel = Arc::new(AtomicBool::new(false));
        let cancel_flag = Arc::clone(&cancel);

        let handle = thread::spawn(move || {
            let mut frames = 0u64;
            let mut skipped = 0u64;
            let mut next_deadline = Instant::now();

            while !cancel_flag.load(Ordering::Acquire) {
                match frame() {
                    Ok(()) => frames += 1,
                    Err(error) => match policy {
                        FrameErrorPolicy::Halt => {
                            log::error!("Frame {} failed, halting draw loop: {}", frames, error);
                            return FrameLoopExit::Halted { frames, error };
                        }
                        FrameErrorPolicy::Skip => {
                            log::warn!("Frame {} failed, skipping: {}", frames, error);
                            skipped += 1;
                        }
                    },
                }

                // Deadline pacing; a late frame resets the schedule instead of bursting
                next_deadline += interval;
                let now = Instant::now();
                if next_deadline > now {
                    thread::sleep(next_deadline - now);
                } else {
                    next_deadline = now;
                }
            }

            FrameLoopExit::Stopped { frames, skipped }
        });

        Self {
            cancel,
            handle: Some(handle),
        }
    }

    /// True until the loop thread has returned
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Cancel future frames and wait for the loop to finish
    pub fn stop(mut self) -> FrameLoopExit {
        self.cancel.store(true, Ordering::Release);
        self.join()
    }

    fn join(&mut self) -> FrameLoopExit {
        match self.handle.take().map(thread::JoinHandle::join) {
            Some(Ok(exit)) => exit,
            Some(Err(_)) => {
                log::error!("Frame loop thread panicked");
                FrameLoopExit::Stopped {
                    frames: 0,
                    skipped: 0,
                }
            }
            None => FrameLoopExit::Stopped {
                frames: 0,
                skipped: 0,
            },
        }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.cancel.store(true, Ordering::Release);
            self.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;

    const FAST: Duration = Duration::from_millis(1);

    fn missing() -> DrawError {
        DrawError::SurfaceMissing {
            id: "nowhere".to_string(),
        }
    }

    #[test]
    fn test_stop_cancels_future_frames() {
        let count = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&count);
        let frame_loop = FrameLoop::spawn(FAST, FrameErrorPolicy::Halt, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        thread::sleep(Duration::from_millis(30));
        assert!(frame_loop.is_running());

        let exit = frame_loop.stop();
        let stopped_at = count.load(Ordering::SeqCst);
        assert!(stopped_at > 0);
        assert_eq!(
            exit,
            FrameLoopExit::Stopped {
                frames: stopped_at,
                skipped: 0
            }
        );

        thread::sleep(Duration::from_millis(10));
        assert_eq!(count.load(Ordering::SeqCst), stopped_at);
    }

    #[test]
    fn test_halt_policy_reports_error() {
        let frame_loop = FrameLoop::spawn(FAST, FrameErrorPolicy::Halt, || Err(missing()));

        // Loop ends on its own after the first failed frame
        let started = Instant::now();
        while frame_loop.is_running() && started.elapsed() < Duration::from_secs(5) {
            thread::sleep(FAST);
        }
        assert!(!frame_loop.is_running());
        assert_eq!(
            frame_loop.stop(),
            FrameLoopExit::Halted {
                frames: 0,
                error: missing()
            }
        );
    }

    #[test]
    fn test_skip_policy_keeps_running() {
        let count = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&count);
        let frame_loop = FrameLoop::spawn(FAST, FrameErrorPolicy::Skip, move || {
            // Every other frame fails
            if counter.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
                Err(missing())
            } else {
                Ok(())
            }
        });

        thread::sleep(Duration::from_millis(30));
        assert!(frame_loop.is_running());

        match frame_loop.stop() {
            FrameLoopExit::Stopped { frames, skipped } => {
                assert!(skipped > 0);
                assert_eq!(frames + skipped, count.load(Ordering::SeqCst));
            }
            other => panic!("unexpected exit: {:?}", other),
        }
    }
}
