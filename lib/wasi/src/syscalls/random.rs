use std::io;

use super::*;

impl<H: Host> Posix<H> {
    /// ### `random_get()`
    /// Fills `buf` with random bytes from the host
    #[instrument(level = "trace", skip_all, fields(len = buf.len()), err)]
    pub fn random_get(&self, buf: &mut [u8]) -> Result<()> {
        if buf.is_empty() {
            return Ok(());
        }
        for chunk in buf.chunks_mut(host_len(usize::MAX)) {
            check(self.host.random_get(chunk))?;
        }
        Ok(())
    }

    /// A [`Read`](io::Read) source of random bytes.
    pub fn random_reader(&self) -> RandomReader<'_, H> {
        RandomReader { posix: self }
    }
}

/// Reads random bytes from the host, never reaching an end.
pub struct RandomReader<'a, H: Host> {
    posix: &'a Posix<H>,
}

impl<H: Host> io::Read for RandomReader<'_, H> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.posix.random_get(buf)?;
        Ok(buf.len())
    }
}
