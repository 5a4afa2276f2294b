//! Synchronous replies and the host's fixed-size output buffer.

use a3bridge_sqf::SqfValue;

use crate::error::DispatchError;

/// Text returned to the host for a single call, already bounded to the
/// capacity the host reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    text: String,
}

impl Reply {
    /// Build a reply that fits a buffer of `capacity` bytes.
    ///
    /// One byte is reserved for the terminating NUL, so at most
    /// `capacity - 1` bytes of text are kept. The cut never splits a UTF-8
    /// character.
    #[must_use]
    pub fn bounded(text: impl Into<String>, capacity: usize) -> Self {
        let mut text = text.into();
        let limit = truncate_len(&text, capacity.saturating_sub(1));
        text.truncate(limit);
        Self { text }
    }

    /// The failure reply `[command, message]` for a dispatch error.
    #[must_use]
    pub fn failure(error: &DispatchError, capacity: usize) -> Self {
        let shape = SqfValue::Array(vec![
            SqfValue::from(error.command()),
            SqfValue::from(error.to_string()),
        ]);
        Self::bounded(a3bridge_sqf::encode(&shape), capacity)
    }

    /// The reply text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Consume the reply, returning its text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.text
    }

    /// Copy the reply into a host buffer followed by a NUL terminator.
    ///
    /// Returns the number of text bytes written. Writes nothing into an
    /// empty buffer.
    pub fn write_to(&self, buffer: &mut [u8]) -> usize {
        let Some(room) = buffer.len().checked_sub(1) else {
            return 0;
        };
        let bytes = self.text.as_bytes();
        let len = truncate_len(&self.text, room);
        if let (Some(dst), Some(src)) = (buffer.get_mut(..len), bytes.get(..len)) {
            dst.copy_from_slice(src);
        }
        if let Some(terminator) = buffer.get_mut(len) {
            *terminator = 0;
        }
        len
    }
}

/// Largest prefix length of `text` that is at most `max_bytes` and ends on
/// a character boundary.
fn truncate_len(text: &str, max_bytes: usize) -> usize {
    if text.len() <= max_bytes {
        return text.len();
    }
    let mut end = max_bytes;
    while end > 0 && !text.is_char_boundary(end) {
        end = end.saturating_sub(1);
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_reserves_terminator() {
        assert_eq!(Reply::bounded("hello world", 6).as_str(), "hello");
        assert_eq!(Reply::bounded("hello", 6).as_str(), "hello");
        assert_eq!(Reply::bounded("hello", 1).as_str(), "");
        assert_eq!(Reply::bounded("hello", 0).as_str(), "");
    }

    #[test]
    fn bounded_never_splits_characters() {
        // 'é' is two bytes
        assert_eq!(Reply::bounded("café", 5).as_str(), "caf");
        assert_eq!(Reply::bounded("café", 6).as_str(), "café");
    }

    #[test]
    fn failure_shape_names_the_command() {
        let err = DispatchError::HandlerNotSet {
            command: "test".into(),
            shape: crate::error::CallShape::Args,
        };
        assert_eq!(Reply::failure(&err, 1024).as_str(), r#"["test", "function not set"]"#);
    }

    #[test]
    fn failure_shape_escapes_handler_text() {
        let err = DispatchError::HandlerExecution {
            command: "save".into(),
            message: r#"bad "name""#.into(),
        };
        assert_eq!(Reply::failure(&err, 1024).as_str(), r#"["save", "bad ""name"""]"#);
    }

    #[test]
    fn write_to_terminates_and_truncates() {
        let reply = Reply::bounded("abcdef", 64);

        let mut large = [0xFF_u8; 10];
        assert_eq!(reply.write_to(&mut large), 6);
        assert_eq!(&large[..7], b"abcdef\0");
        assert_eq!(large[7], 0xFF);

        let mut small = [0xFF_u8; 4];
        assert_eq!(reply.write_to(&mut small), 3);
        assert_eq!(&small, b"abc\0");

        let mut empty: [u8; 0] = [];
        assert_eq!(reply.write_to(&mut empty), 0);
    }
}
