/*++

Licensed under the Apache-2.0 license.

File Name:

    log.rs

Abstract:

    File contains a shared text log used to record bus activity in unit tests.

--*/
use std::{
    cell::{Ref, RefCell},
    fmt,
    ops::Deref,
    rc::Rc,
};

/// Append-only text buffer that can be written through a shared reference.
/// Clones share the same buffer, so a fake bus moved into a driver can still
/// be inspected by the test that created it.
///
/// ```
/// use khazad_emu_bus::testing::Log;
/// use std::fmt::Write;
///
/// let log = Log::new();
/// writeln!(log.w(), "write(Word, 0x0, 0x9)").unwrap();
/// assert_eq!("write(Word, 0x0, 0x9)\n", &*log.as_str());
/// assert_eq!("write(Word, 0x0, 0x9)\n", log.take());
/// assert_eq!("", log.take());
/// ```
#[derive(Clone, Default)]
pub struct Log {
    buf: Rc<RefCell<String>>,
}
impl Log {
    /// Construct an empty `Log`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the current contents.
    pub fn as_str(&self) -> impl Deref<Target = str> + '_ {
        Ref::map(self.buf.borrow(), String::as_str)
    }

    /// Empty the log and return what it held.
    pub fn take(&self) -> String {
        self.buf.take()
    }

    /// Returns a writer for use with write!() or writeln!().
    pub fn w(&self) -> impl fmt::Write + '_ {
        LogWriter(&self.buf)
    }
}

struct LogWriter<'a>(&'a RefCell<String>);
impl fmt::Write for LogWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.borrow_mut().push_str(s);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write;

    #[test]
    fn test_clones_share_buffer() {
        let log = Log::new();
        writeln!(log.clone().w(), "Line 1").unwrap();
        write!(log.w(), "Line {}", 2).unwrap();
        assert_eq!("Line 1\nLine 2", &*log.as_str());
        assert_eq!("Line 1\nLine 2", log.take());
        assert_eq!("", log.take());
    }
}
