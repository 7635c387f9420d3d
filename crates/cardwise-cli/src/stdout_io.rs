use std::io::{self, Write};

/// Writes `text` as-is. A reader that hung up (`cardwise usage | head`) is not an error.
pub fn write_stdout_text(text: &str) -> io::Result<()> {
    write_tolerant(&mut io::stdout().lock(), text, false)
}

pub fn write_stdout_line(text: &str) -> io::Result<()> {
    write_tolerant(&mut io::stdout().lock(), text, true)
}

fn write_tolerant(writer: &mut dyn Write, text: &str, newline: bool) -> io::Result<()> {
    let result = writer
        .write_all(text.as_bytes())
        .and_then(|()| if newline { writer.write_all(b"\n") } else { Ok(()) })
        .and_then(|()| writer.flush());
    match result {
        Err(error) if error.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};

    use super::write_tolerant;

    struct FailingWriter(io::ErrorKind);

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(self.0))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn appends_newline_only_when_asked() {
        let mut buffer = Vec::new();
        assert!(write_tolerant(&mut buffer, "usage", true).is_ok());
        assert!(write_tolerant(&mut buffer, "help", false).is_ok());
        assert_eq!(buffer, b"usage\nhelp");
    }

    #[test]
    fn broken_pipe_is_swallowed_but_other_errors_surface() {
        let mut closed = FailingWriter(io::ErrorKind::BrokenPipe);
        assert!(write_tolerant(&mut closed, "x", true).is_ok());

        let mut denied = FailingWriter(io::ErrorKind::PermissionDenied);
        assert!(write_tolerant(&mut denied, "x", true).is_err());
    }
}
