//! Progressive reveal of a newly arrived assistant message.
//!
//! The reveal is modeled as a lazy, finite, non-restartable sequence of
//! string prefixes ([`RevealSequence`]) driven by a cooperative timer
//! ([`RevealScheduler`]). Only the most recently appended assistant message
//! animates; earlier messages yield their full text in a single, already
//! completed frame.
//!
//! Cancellation: the timer task is the only long-lived resource here and is
//! released on every exit path — the consumer drops the handle, the token is
//! cancelled, or the sequence runs out. A cancelled reveal emits no further
//! frames, so stale callbacks can never mutate state after the message is no
//! longer the latest one.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Lazy, finite sequence of prefixes of a target string.
///
/// Each step extends the previous prefix by exactly one character (never by
/// bytes, so multibyte text stays well-formed). The sequence ends at the
/// full target and cannot be restarted.
#[derive(Debug, Clone)]
pub struct RevealSequence {
    chars: Vec<char>,
    emitted: usize,
}

impl RevealSequence {
    /// Creates a sequence over the given target string.
    pub fn new(target: &str) -> Self {
        Self {
            chars: target.chars().collect(),
            emitted: 0,
        }
    }

    /// True once the full target has been emitted (or the target is empty).
    pub fn is_completed(&self) -> bool {
        self.emitted >= self.chars.len()
    }

    /// Total number of characters in the target.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// True if the target string is empty.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

impl Iterator for RevealSequence {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.is_completed() {
            return None;
        }
        self.emitted += 1;
        Some(self.chars[..self.emitted].iter().collect())
    }
}

/// One emission of the reveal: the currently visible text and whether the
/// reveal has reached the full target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealFrame {
    pub text: String,
    pub is_completed: bool,
}

/// Consumer side of a running reveal.
///
/// Frames are consumed at the view's own pace. Dropping the handle cancels
/// the timer task, so a superseded message stops animating immediately.
pub struct RevealHandle {
    rx: mpsc::UnboundedReceiver<RevealFrame>,
    cancel: CancellationToken,
}

impl RevealHandle {
    /// Waits for the next frame. Returns `None` once the reveal has
    /// finished or been cancelled.
    pub async fn next_frame(&mut self) -> Option<RevealFrame> {
        self.rx.recv().await
    }

    /// Cancels the reveal. No further frames are emitted.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Drop for RevealHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Paces the visible growth of the newest assistant message.
#[derive(Debug, Clone)]
pub struct RevealScheduler {
    interval: Duration,
}

impl RevealScheduler {
    /// Creates a scheduler emitting one character per `interval`.
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Starts revealing `target`.
    ///
    /// For the latest assistant message (`is_latest == true`) one frame is
    /// emitted per interval, each extending the visible prefix by one
    /// character, the last one carrying `is_completed == true`. For any
    /// earlier message the full text is emitted in a single completed frame
    /// with no timer involved.
    pub fn reveal(&self, target: &str, is_latest: bool) -> RevealHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        if !is_latest || target.is_empty() {
            // No animation replay for earlier messages.
            let _ = tx.send(RevealFrame {
                text: target.to_string(),
                is_completed: true,
            });
            return RevealHandle { rx, cancel };
        }

        let mut sequence = RevealSequence::new(target);
        let interval = self.interval;
        let token = cancel.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {
                        let Some(prefix) = sequence.next() else { break };
                        let frame = RevealFrame {
                            text: prefix,
                            is_completed: sequence.is_completed(),
                        };
                        if tx.send(frame).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        RevealHandle { rx, cancel }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_emits_cumulative_prefixes() {
        let prefixes: Vec<String> = RevealSequence::new("abc").collect();
        assert_eq!(prefixes, vec!["a", "ab", "abc"]);
    }

    #[test]
    fn test_sequence_is_char_boundary_safe() {
        let prefixes: Vec<String> = RevealSequence::new("héllo").collect();
        assert_eq!(prefixes[0], "h");
        assert_eq!(prefixes[1], "hé");
        assert_eq!(prefixes.last().unwrap(), "héllo");
    }

    #[test]
    fn test_empty_sequence_is_completed_immediately() {
        let mut sequence = RevealSequence::new("");
        assert!(sequence.is_completed());
        assert_eq!(sequence.next(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_completes_exactly_at_final_tick() {
        let target = "a".repeat(20);
        let scheduler = RevealScheduler::new(Duration::from_millis(15));
        let mut handle = scheduler.reveal(&target, true);

        for tick in 1..=20usize {
            let frame = handle.next_frame().await.unwrap();
            assert_eq!(frame.text.chars().count(), tick);
            assert_eq!(frame.is_completed, tick == 20, "tick {}", tick);
        }

        let last = RevealSequence::new(&target).last().unwrap();
        assert_eq!(last, target);
        assert!(handle.next_frame().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_latest_message_is_shown_in_full_immediately() {
        let scheduler = RevealScheduler::new(Duration::from_millis(15));
        let mut handle = scheduler.reveal("older message", false);

        let frame = handle.next_frame().await.unwrap();
        assert_eq!(frame.text, "older message");
        assert!(frame.is_completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_further_frames() {
        let scheduler = RevealScheduler::new(Duration::from_millis(15));
        let mut handle = scheduler.reveal(&"x".repeat(20), true);

        for _ in 0..3 {
            handle.next_frame().await.unwrap();
        }
        handle.cancel();

        let mut received_after_cancel = 0;
        while handle.next_frame().await.is_some() {
            received_after_cancel += 1;
        }
        // At most one frame was already in flight when the token flipped.
        assert!(received_after_cancel <= 1);
    }
}
