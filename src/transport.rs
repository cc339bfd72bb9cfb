//! Ordered delivery of HID reports.

use std::io;

use bytes::{BufMut, Bytes, BytesMut};
use hidapi::HidDevice;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::layout::BUFFER_SIZE;

/// Output report size accepted by the controller.
pub const CHUNK_SIZE: usize = 64;

/// Report ID prepended to feature reports.
pub const FEATURE_REPORT_ID: u8 = 0x00;

/// Writable HID device channel.
pub trait HidChannel {
    /// Send a feature report, without its report ID.
    fn send_feature_report(&mut self, report: &[u8]) -> io::Result<()>;

    /// Write an output report, returning the number of bytes written.
    fn write(&mut self, data: &[u8]) -> io::Result<usize>;
}

impl HidChannel for HidDevice {
    fn send_feature_report(&mut self, report: &[u8]) -> io::Result<()> {
        let mut buf = BytesMut::with_capacity(report.len() + 1);
        buf.put_u8(FEATURE_REPORT_ID);
        buf.put_slice(report);

        HidDevice::send_feature_report(self, &buf).map_err(io::Error::other)
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        HidDevice::write(self, data).map_err(io::Error::other)
    }
}

impl<C: HidChannel + ?Sized> HidChannel for &mut C {
    fn send_feature_report(&mut self, report: &[u8]) -> io::Result<()> {
        (**self).send_feature_report(report)
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        (**self).write(data)
    }
}

/// Single report of a transmission.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Report {
    Feature(Bytes),
    Output(Bytes),
}

impl Report {
    pub fn bytes(&self) -> &Bytes {
        match self {
            Self::Feature(bytes) | Self::Output(bytes) => bytes,
        }
    }

    fn send<C: HidChannel + ?Sized>(&self, channel: &mut C) -> io::Result<()> {
        match self {
            Self::Feature(report) => channel.send_feature_report(report),
            Self::Output(data) => {
                let written = channel.write(data)?;
                if written != data.len() {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        format!("short write: {written} of {} bytes", data.len()),
                    ));
                }
                Ok(())
            },
        }
    }
}

/// Progress of a transmission.
///
/// Positions are 1-based indices into the transmission's reports.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub enum TransmissionState {
    Idle,
    Writing { index: usize, total: usize },
    Done,
    Failed { index: usize, total: usize },
}

/// Reports delivered in order as one command.
///
/// A failed transmission is never resumed, the command has to be sent again
/// from the start.
#[derive(Debug)]
pub struct Transmission {
    reports: Vec<Report>,
    state: TransmissionState,
}

impl Transmission {
    pub fn new(reports: Vec<Report>) -> Self {
        Self { reports, state: TransmissionState::Idle }
    }

    pub fn state(&self) -> TransmissionState {
        self.state
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    /// Write all reports to the channel.
    ///
    /// Nothing is written once the transmission has finished; a failed
    /// transmission keeps reporting an error.
    pub fn run<C: HidChannel + ?Sized>(&mut self, channel: &mut C) -> Result<()> {
        let total = self.reports.len();

        match self.state {
            TransmissionState::Idle => (),
            TransmissionState::Done => return Ok(()),
            TransmissionState::Writing { index, .. } | TransmissionState::Failed { index, .. } => {
                return Err(Error::Transport {
                    index,
                    total,
                    source: io::Error::other("transmission already aborted"),
                });
            },
        }

        for (i, report) in self.reports.iter().enumerate() {
            let index = i + 1;
            self.state = TransmissionState::Writing { index, total };
            debug!("Writing report {index}/{total}: {:02x?}", &report.bytes()[..]);

            if let Err(source) = report.send(channel) {
                warn!("Transmission failed at report {index}/{total}: {source}");
                self.state = TransmissionState::Failed { index, total };
                return Err(Error::Transport { index, total, source });
            }
        }

        self.state = TransmissionState::Done;

        Ok(())
    }
}

/// Split a color buffer into output reports of `chunk_size` bytes.
pub fn chunks(buffer: &Bytes, chunk_size: usize) -> Result<Vec<Bytes>> {
    validate_chunk_size(chunk_size)?;

    let chunks = (0..buffer.len())
        .step_by(chunk_size)
        .map(|start| buffer.slice(start..(start + chunk_size).min(buffer.len())))
        .collect();

    Ok(chunks)
}

/// Check that a chunk size evenly divides the color buffer.
pub fn validate_chunk_size(chunk_size: usize) -> Result<()> {
    // The chunk count is announced to the controller in a single byte.
    let valid = chunk_size > 0
        && chunk_size < BUFFER_SIZE
        && BUFFER_SIZE % chunk_size == 0
        && BUFFER_SIZE / chunk_size <= u8::MAX as usize;

    if !valid {
        return Err(Error::invalid_parameter("chunk size", chunk_size));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Channel recording every report, failing on a selected output write.
    #[derive(Default)]
    struct FakeChannel {
        features: Vec<Vec<u8>>,
        writes: Vec<Vec<u8>>,
        fail_write: Option<usize>,
        short_write: bool,
    }

    impl HidChannel for FakeChannel {
        fn send_feature_report(&mut self, report: &[u8]) -> io::Result<()> {
            self.features.push(report.to_vec());
            Ok(())
        }

        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            if self.fail_write == Some(self.writes.len() + 1) {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device gone"));
            }

            self.writes.push(data.to_vec());

            if self.short_write {
                Ok(data.len() - 1)
            } else {
                Ok(data.len())
            }
        }
    }

    fn numbered_buffer() -> Bytes {
        (0..BUFFER_SIZE).map(|i| i as u8).collect::<Vec<_>>().into()
    }

    fn output_reports(buffer: &Bytes) -> Vec<Report> {
        chunks(buffer, CHUNK_SIZE).unwrap().into_iter().map(Report::Output).collect()
    }

    #[test]
    fn chunks_cover_buffer_in_order() {
        let buffer = numbered_buffer();
        let chunks = chunks(&buffer, CHUNK_SIZE).unwrap();

        assert_eq!(chunks.len(), 8);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.len(), CHUNK_SIZE);
            assert_eq!(&chunk[..], &buffer[i * CHUNK_SIZE..(i + 1) * CHUNK_SIZE]);
        }
    }

    #[test]
    fn chunk_size_validation() {
        for valid in [4, 8, 16, 32, 64, 128, 256] {
            assert!(validate_chunk_size(valid).is_ok(), "{valid}");
        }

        for invalid in [0, 1, 2, 3, 60, 512, 1024] {
            let result = validate_chunk_size(invalid);
            assert!(
                matches!(result, Err(Error::InvalidParameter { field: "chunk size", .. })),
                "{invalid}"
            );
        }
    }

    #[test]
    fn writes_every_chunk() {
        let buffer = numbered_buffer();
        let mut channel = FakeChannel::default();
        let mut transmission = Transmission::new(output_reports(&buffer));

        transmission.run(&mut channel).unwrap();

        assert_eq!(transmission.state(), TransmissionState::Done);
        assert_eq!(channel.writes.len(), 8);
        assert_eq!(channel.writes.concat(), buffer.to_vec());
        assert!(channel.features.is_empty());
    }

    #[test]
    fn stops_at_failed_chunk() {
        let buffer = numbered_buffer();
        let mut channel = FakeChannel { fail_write: Some(4), ..Default::default() };
        let mut transmission = Transmission::new(output_reports(&buffer));

        let err = transmission.run(&mut channel).unwrap_err();

        assert!(matches!(err, Error::Transport { index: 4, total: 8, .. }));
        assert_eq!(transmission.state(), TransmissionState::Failed { index: 4, total: 8 });
        assert_eq!(channel.writes.len(), 3);
        assert_eq!(channel.writes.concat(), buffer[..3 * CHUNK_SIZE].to_vec());

        // Failed transmissions are not resumed.
        channel.fail_write = None;
        assert!(transmission.run(&mut channel).is_err());
        assert_eq!(channel.writes.len(), 3);
    }

    #[test]
    fn short_write_is_an_error() {
        let buffer = numbered_buffer();
        let mut channel = FakeChannel { short_write: true, ..Default::default() };
        let mut transmission = Transmission::new(output_reports(&buffer));

        let err = transmission.run(&mut channel).unwrap_err();

        match err {
            Error::Transport { index, source, .. } => {
                assert_eq!(index, 1);
                assert_eq!(source.kind(), io::ErrorKind::WriteZero);
            },
            err => panic!("unexpected error: {err:?}"),
        }
        assert_eq!(channel.writes.len(), 1);
    }

    #[test]
    fn feature_reports_are_sent_as_is() {
        let report = Bytes::from_static(&[1, 2, 3]);
        let mut channel = FakeChannel::default();
        let mut transmission = Transmission::new(vec![Report::Feature(report.clone())]);

        transmission.run(&mut channel).unwrap();
        assert_eq!(channel.features, vec![report.to_vec()]);

        // Completed transmissions are not repeated.
        transmission.run(&mut channel).unwrap();
        assert_eq!(channel.features.len(), 1);
    }
}
