//! Transport traits consumed by the driver

use crate::HidCommonResult;

/// Direction of a control-channel feature report transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlDirection {
    /// SET_REPORT: host to device.
    Set,
    /// GET_REPORT: device to host, filling `buffer` in place.
    Get,
}

/// Synchronous request/response control channel of a HID interface.
///
/// `buffer` always starts with the report number byte. Implementations return
/// the number of bytes transferred; a count shorter than `buffer.len()` is a
/// short transfer that the caller treats as an error. Calls may block for as
/// long as the underlying hardware takes.
pub trait ControlChannel: Send + Sync {
    fn control_exchange(
        &self,
        buffer: &mut [u8],
        direction: ControlDirection,
    ) -> HidCommonResult<usize>;
}

/// Blocking source of interrupt input frames.
pub trait FrameSource: Send {
    /// Read one frame into `buf`, waiting at most `timeout_ms` milliseconds
    /// (negative waits forever). Returns `Ok(0)` when the wait timed out.
    fn read_frame(&mut self, buf: &mut [u8], timeout_ms: i32) -> HidCommonResult<usize>;
}

pub mod mock {
    //! Scripted in-memory transport.

    use super::*;
    use crate::HidCommonError;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Failure injected into the next matching transfer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum MockFault {
        /// Transfer fails with a negative status.
        Status(i32),
        /// Transfer reports only this many bytes.
        Short(usize),
    }

    #[derive(Debug, Clone, Copy)]
    struct SetFilter {
        offset: usize,
        value: u8,
        fault: MockFault,
    }

    #[derive(Debug, Default)]
    struct MockState {
        exchanges: Vec<(ControlDirection, Vec<u8>)>,
        answers: VecDeque<Vec<u8>>,
        set_faults: VecDeque<MockFault>,
        get_faults: VecDeque<MockFault>,
        set_filters: Vec<SetFilter>,
        last_set: Vec<u8>,
        latency: Duration,
    }

    /// Control channel that records every transfer and replays scripted
    /// GET answers.
    ///
    /// When no answer is queued, a GET echoes the buffer of the most recent
    /// SET, which is what the hardware does for requests it acknowledges.
    #[derive(Debug, Clone, Default)]
    pub struct MockControlChannel {
        state: Arc<Mutex<MockState>>,
    }

    impl MockControlChannel {
        pub fn new() -> Self {
            Self::default()
        }

        fn with_state<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            f(&mut state)
        }

        /// Queue the raw buffer returned by the next GET.
        pub fn queue_answer(&self, buffer: impl Into<Vec<u8>>) {
            let buffer = buffer.into();
            self.with_state(|s| s.answers.push_back(buffer));
        }

        pub fn fail_next_set(&self, fault: MockFault) {
            self.with_state(|s| s.set_faults.push_back(fault));
        }

        pub fn fail_next_get(&self, fault: MockFault) {
            self.with_state(|s| s.get_faults.push_back(fault));
        }

        /// Fail every SET whose byte at `offset` equals `value`.
        pub fn fail_sets_where(&self, offset: usize, value: u8, fault: MockFault) {
            self.with_state(|s| {
                s.set_filters.push(SetFilter {
                    offset,
                    value,
                    fault,
                })
            });
        }

        /// Sleep this long inside every transfer.
        pub fn set_latency(&self, latency: Duration) {
            self.with_state(|s| s.latency = latency);
        }

        /// Every transfer in order, with the buffer as it was sent (SET) or
        /// returned (GET).
        pub fn exchanges(&self) -> Vec<(ControlDirection, Vec<u8>)> {
            self.with_state(|s| s.exchanges.clone())
        }

        pub fn set_history(&self) -> Vec<Vec<u8>> {
            self.with_state(|s| {
                s.exchanges
                    .iter()
                    .filter(|(dir, _)| *dir == ControlDirection::Set)
                    .map(|(_, buf)| buf.clone())
                    .collect()
            })
        }

        pub fn get_count(&self) -> usize {
            self.with_state(|s| {
                s.exchanges
                    .iter()
                    .filter(|(dir, _)| *dir == ControlDirection::Get)
                    .count()
            })
        }

        pub fn exchange_count(&self) -> usize {
            self.with_state(|s| s.exchanges.len())
        }

        pub fn clear_history(&self) {
            self.with_state(|s| s.exchanges.clear());
        }

        fn apply_fault(fault: MockFault) -> HidCommonResult<usize> {
            match fault {
                MockFault::Status(status) => Err(HidCommonError::Status(status)),
                MockFault::Short(len) => Ok(len),
            }
        }
    }

    impl ControlChannel for MockControlChannel {
        fn control_exchange(
            &self,
            buffer: &mut [u8],
            direction: ControlDirection,
        ) -> HidCommonResult<usize> {
            let latency = self.with_state(|s| s.latency);
            if !latency.is_zero() {
                std::thread::sleep(latency);
            }

            self.with_state(|s| match direction {
                ControlDirection::Set => {
                    s.exchanges.push((direction, buffer.to_vec()));
                    s.last_set = buffer.to_vec();
                    let filtered = s
                        .set_filters
                        .iter()
                        .find(|f| buffer.get(f.offset).copied() == Some(f.value))
                        .map(|f| f.fault);
                    match s.set_faults.pop_front().or(filtered) {
                        Some(fault) => Self::apply_fault(fault),
                        None => Ok(buffer.len()),
                    }
                }
                ControlDirection::Get => {
                    if let Some(fault) = s.get_faults.pop_front() {
                        s.exchanges.push((direction, buffer.to_vec()));
                        return Self::apply_fault(fault);
                    }
                    let (source, len) = match s.answers.pop_front() {
                        Some(answer) => {
                            let len = answer.len().min(buffer.len());
                            (answer, len)
                        }
                        None => (s.last_set.clone(), buffer.len()),
                    };
                    buffer.fill(0);
                    let copy = source.len().min(buffer.len());
                    if let (Some(dst), Some(src)) = (buffer.get_mut(..copy), source.get(..copy)) {
                        dst.copy_from_slice(src);
                    }
                    s.exchanges.push((direction, buffer.to_vec()));
                    Ok(len)
                }
            })
        }
    }

    /// Frame source replaying queued frames, then timing out.
    #[derive(Debug, Default)]
    pub struct MockFrameSource {
        frames: VecDeque<Vec<u8>>,
    }

    impl MockFrameSource {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_frame(&mut self, frame: impl Into<Vec<u8>>) {
            self.frames.push_back(frame.into());
        }

        pub fn pending(&self) -> usize {
            self.frames.len()
        }
    }

    impl FrameSource for MockFrameSource {
        fn read_frame(&mut self, buf: &mut [u8], _timeout_ms: i32) -> HidCommonResult<usize> {
            let Some(frame) = self.frames.pop_front() else {
                return Ok(0);
            };
            let len = frame.len().min(buf.len());
            if let (Some(dst), Some(src)) = (buf.get_mut(..len), frame.get(..len)) {
                dst.copy_from_slice(src);
            }
            Ok(len)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::*;
    use super::*;
    use crate::HidCommonError;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_mock_records_sets_in_order() -> TestResult {
        let channel = MockControlChannel::new();
        let mut first = [0u8, 0x87, 0x03];
        let mut second = [0u8, 0x81, 0x00];

        assert_eq!(channel.control_exchange(&mut first, ControlDirection::Set)?, 3);
        assert_eq!(channel.control_exchange(&mut second, ControlDirection::Set)?, 3);

        assert_eq!(channel.set_history(), vec![first.to_vec(), second.to_vec()]);
        assert_eq!(channel.get_count(), 0);
        Ok(())
    }

    #[test]
    fn test_mock_get_echoes_last_set_without_script() -> TestResult {
        let channel = MockControlChannel::new();
        let mut buf = [0u8, 0xB4, 0x00, 0x00];
        channel.control_exchange(&mut buf, ControlDirection::Set)?;

        let mut answer = [0xFFu8; 4];
        let len = channel.control_exchange(&mut answer, ControlDirection::Get)?;
        assert_eq!(len, 4);
        assert_eq!(answer, [0u8, 0xB4, 0x00, 0x00]);
        Ok(())
    }

    #[test]
    fn test_mock_get_replays_scripted_answer() -> TestResult {
        let channel = MockControlChannel::new();
        channel.queue_answer(vec![0u8, 0xAE, 0x02, 0x01, b'X']);

        let mut answer = [0u8; 8];
        let len = channel.control_exchange(&mut answer, ControlDirection::Get)?;
        assert_eq!(len, 5);
        assert_eq!(answer, [0u8, 0xAE, 0x02, 0x01, b'X', 0, 0, 0]);
        Ok(())
    }

    #[test]
    fn test_mock_faults() -> TestResult {
        let channel = MockControlChannel::new();
        channel.fail_next_set(MockFault::Status(-5));
        channel.fail_next_get(MockFault::Short(10));

        let mut buf = [0u8; 65];
        let result = channel.control_exchange(&mut buf, ControlDirection::Set);
        assert!(matches!(result, Err(HidCommonError::Status(-5))));

        assert_eq!(channel.control_exchange(&mut buf, ControlDirection::Get)?, 10);
        assert_eq!(channel.control_exchange(&mut buf, ControlDirection::Set)?, 65);
        assert_eq!(channel.exchange_count(), 3);
        Ok(())
    }

    #[test]
    fn test_mock_set_filter_matches_byte() -> TestResult {
        let channel = MockControlChannel::new();
        channel.fail_sets_where(1, 0x85, MockFault::Status(-71));

        let mut ok = [0u8, 0x81];
        let mut bad = [0u8, 0x85];
        assert_eq!(channel.control_exchange(&mut ok, ControlDirection::Set)?, 2);
        assert!(channel.control_exchange(&mut bad, ControlDirection::Set).is_err());
        assert!(channel.control_exchange(&mut bad, ControlDirection::Set).is_err());
        Ok(())
    }

    #[test]
    fn test_mock_frame_source_times_out_when_empty() -> TestResult {
        let mut source = MockFrameSource::new();
        source.push_frame(vec![1, 2, 3]);

        let mut buf = [0u8; 64];
        assert_eq!(source.read_frame(&mut buf, 10)?, 3);
        assert_eq!(buf.get(..3), Some(&[1u8, 2, 3][..]));
        assert_eq!(source.read_frame(&mut buf, 10)?, 0);
        assert_eq!(source.pending(), 0);
        Ok(())
    }
}
