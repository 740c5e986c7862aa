//! Feature report request/response over the control channel.
//!
//! A request is a SET of the framed 65-byte buffer. When an answer is wanted
//! the caller blocks for the settle delay, then issues a GET on the same
//! buffer and validates what came back. Nothing is retried here.

use std::sync::Arc;
use std::time::Duration;

use hid_steam_controller_protocol::{
    FEATURE_REPORT_SIZE, FeatureAnswer, FeatureRequest, parse_answer,
};
use parking_lot::{Mutex, MutexGuard};
use sc_hid_common::{ControlChannel, ControlDirection, HidCommonError};
use tracing::{debug, trace};

use crate::error::DriverResult;

/// Serialized access to a device's control channel.
pub struct FeatureClient {
    channel: Arc<dyn ControlChannel>,
    settle_delay: Duration,
    io: Mutex<()>,
}

impl FeatureClient {
    pub fn new(channel: Arc<dyn ControlChannel>, settle_delay: Duration) -> Self {
        Self {
            channel,
            settle_delay,
            io: Mutex::new(()),
        }
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Hold the control channel across several requests.
    pub fn lock(&self) -> FeatureIo<'_> {
        FeatureIo {
            client: self,
            _guard: self.io.lock(),
        }
    }

    /// One request under its own lock.
    ///
    /// # Errors
    ///
    /// See [`FeatureIo::send_request`].
    pub fn send_request(
        &self,
        report_id: u8,
        params: &[u8],
        want_answer: bool,
    ) -> DriverResult<Option<FeatureAnswer>> {
        self.lock().send_request(report_id, params, want_answer)
    }
}

impl std::fmt::Debug for FeatureClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureClient")
            .field("settle_delay", &self.settle_delay)
            .finish_non_exhaustive()
    }
}

/// Exclusive use of the control channel. Released on drop.
pub struct FeatureIo<'a> {
    client: &'a FeatureClient,
    _guard: MutexGuard<'a, ()>,
}

impl FeatureIo<'_> {
    /// Send `params` under `report_id`, optionally reading back the answer.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` when `params` is longer than 62 bytes; the
    ///   channel is not touched.
    /// - `Transport` on a failed or short SET/GET.
    /// - `Protocol` when the answer echoes another report id or declares
    ///   more than 61 bytes.
    pub fn send_request(
        &mut self,
        report_id: u8,
        params: &[u8],
        want_answer: bool,
    ) -> DriverResult<Option<FeatureAnswer>> {
        let request = FeatureRequest::new(report_id, params)?;
        let mut buffer = request.encode();
        trace!("feature 0x{report_id:02X} set {:02X?}", params);

        self.exchange(&mut buffer, ControlDirection::Set)?;
        if !want_answer {
            return Ok(None);
        }

        std::thread::sleep(self.client.settle_delay);
        self.exchange(&mut buffer, ControlDirection::Get)?;

        let answer = parse_answer(&buffer, report_id)?;
        debug!(
            "feature 0x{report_id:02X} answered with {} bytes",
            answer.len()
        );
        Ok(Some(answer))
    }

    fn exchange(
        &mut self,
        buffer: &mut [u8; FEATURE_REPORT_SIZE],
        direction: ControlDirection,
    ) -> DriverResult<()> {
        let transferred = self.client.channel.control_exchange(buffer, direction)?;
        if transferred < buffer.len() {
            return Err(HidCommonError::ShortTransfer {
                expected: buffer.len(),
                actual: transferred,
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DriverError;
    use hid_steam_controller_protocol::encode_answer_frame;
    use sc_hid_common::mock::{MockControlChannel, MockFault};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn client(mock: &MockControlChannel) -> FeatureClient {
        FeatureClient::new(Arc::new(mock.clone()), Duration::from_millis(1))
    }

    #[test]
    fn set_only_request_skips_get() -> TestResult {
        let mock = MockControlChannel::new();
        let answer = client(&mock).send_request(0x81, &[], false)?;
        assert!(answer.is_none());
        assert_eq!(mock.exchange_count(), 1);
        assert_eq!(mock.get_count(), 0);
        Ok(())
    }

    #[test]
    fn answered_request_validates_echo() -> TestResult {
        let mock = MockControlChannel::new();
        mock.queue_answer(encode_answer_frame(0xAE, b"\x01SERIAL"));
        let answer = client(&mock).send_request(0xAE, &[0x01], true)?;
        assert_eq!(
            answer.map(|a| a.payload),
            Some(b"\x01SERIAL".to_vec())
        );
        assert_eq!(mock.get_count(), 1);
        Ok(())
    }

    #[test]
    fn oversized_params_never_reach_channel() {
        let mock = MockControlChannel::new();
        let result = client(&mock).send_request(0x87, &[0u8; 63], true);
        assert!(matches!(result, Err(DriverError::InvalidArgument(_))));
        assert_eq!(mock.exchange_count(), 0);
    }

    #[test]
    fn short_set_is_transport_error() {
        let mock = MockControlChannel::new();
        mock.fail_next_set(MockFault::Short(10));
        let result = client(&mock).send_request(0x87, &[0x08, 0x07, 0x00], false);
        assert!(matches!(
            result,
            Err(DriverError::Transport(HidCommonError::ShortTransfer {
                expected: 65,
                actual: 10
            }))
        ));
    }

    #[test]
    fn failed_get_is_transport_error() {
        let mock = MockControlChannel::new();
        mock.fail_next_get(MockFault::Status(-32));
        let result = client(&mock).send_request(0xAE, &[0x01], true);
        assert!(matches!(
            result,
            Err(DriverError::Transport(HidCommonError::Status(-32)))
        ));
    }

    #[test]
    fn mismatched_echo_is_protocol_error() {
        let mock = MockControlChannel::new();
        mock.queue_answer(encode_answer_frame(0x87, &[]));
        let result = client(&mock).send_request(0xAE, &[0x01], true);
        assert!(matches!(result, Err(DriverError::Protocol(_))));
    }

    #[test]
    fn settle_delay_precedes_get() -> TestResult {
        let mock = MockControlChannel::new();
        let client = FeatureClient::new(Arc::new(mock.clone()), Duration::from_millis(30));
        let start = std::time::Instant::now();
        client.send_request(0xB4, &[], true)?;
        assert!(start.elapsed() >= Duration::from_millis(30));
        Ok(())
    }
}
