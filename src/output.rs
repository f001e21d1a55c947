//! Stream duplication for module output.

use std::io::{self, Write};

/// Writer that duplicates every byte to two sinks, console and dump file.
///
/// Replaces the external `tee` process of the original pipeline. Writes go
/// to both sinks in full before returning; an error from either sink is an
/// error for the write.
pub struct Tee<'a> {
    first: &'a mut dyn Write,
    second: &'a mut dyn Write,
}

impl<'a> Tee<'a> {
    pub fn new(first: &'a mut dyn Write, second: &'a mut dyn Write) -> Self {
        Tee { first, second }
    }
}

impl Write for Tee<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.first.write_all(buf)?;
        self.second.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.first.flush()?;
        self.second.flush()
    }
}
