use std::io::{self, IsTerminal, Read};

/// The trigger payload handed to the notifier on invocation.
///
/// The content is never inspected. It is drained so the writer on the other
/// end of the pipe does not block, and only its size is kept for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Event {
    len: u64,
}

impl Event {
    /// Drain `reader` to the end and discard what was read.
    ///
    /// A read error stops the drain early. The bytes seen up to that point
    /// still count and the error is only logged: malformed input is not a
    /// failure.
    pub fn drain<R: Read>(mut reader: R) -> Self {
        let mut sink = CountingSink::default();
        if let Err(e) = io::copy(&mut reader, &mut sink) {
            log::debug!("stopped reading event after {} bytes: {e}", sink.count);
        }
        Self { len: sink.count }
    }

    /// Read the event from stdin. An interactive terminal yields an empty
    /// event instead of waiting for EOF.
    pub fn from_stdin() -> Self {
        let stdin = io::stdin();
        if stdin.is_terminal() {
            return Self::default();
        }
        Self::drain(stdin.lock())
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl From<&[u8]> for Event {
    fn from(bytes: &[u8]) -> Self {
        Self::drain(bytes)
    }
}

#[derive(Default)]
struct CountingSink {
    count: u64,
}

impl io::Write for CountingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.count += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Yields a few bytes, then fails like a broken pipe.
    struct FlakyReader {
        served: bool,
    }

    impl Read for FlakyReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
            }
            self.served = true;
            buf[..3].copy_from_slice(b"abc");
            Ok(3)
        }
    }

    #[test]
    fn test_empty_input() {
        let event = Event::from(&b""[..]);
        assert!(event.is_empty());
    }

    #[test]
    fn test_garbage_is_just_bytes() {
        let event = Event::from(&b"\xff\xfe{not json\x00"[..]);
        assert_eq!(event.len(), 12);
    }

    #[test]
    fn test_read_error_is_swallowed() {
        let event = Event::drain(FlakyReader { served: false });
        assert_eq!(event.len(), 3);
    }
}
