// Raw/cooked line-discipline switching and the scope guard around dispatch.
use anyhow::Result;
use log::{debug, error};

/// A terminal whose line discipline can be toggled between cooked and raw.
///
/// Implementors supply the low-level transitions; the provided
/// `enable_raw_mode`/`disable_raw_mode` make repeated calls no-ops.
pub trait Terminal {
    fn is_raw(&self) -> bool;

    /// Switches to raw mode. Only called while cooked.
    fn enter_raw(&mut self) -> Result<()>;

    /// Restores the settings captured by `enter_raw`. Only called while raw.
    fn leave_raw(&mut self) -> Result<()>;

    fn enable_raw_mode(&mut self) -> Result<()> {
        if self.is_raw() {
            return Ok(());
        }
        self.enter_raw()?;
        debug!("terminal: raw mode on");
        Ok(())
    }

    fn disable_raw_mode(&mut self) -> Result<()> {
        if !self.is_raw() {
            return Ok(());
        }
        self.leave_raw()?;
        debug!("terminal: raw mode off");
        Ok(())
    }
}

/// Cooked-mode override for the duration of a command.
///
/// Raw mode is restored when the guard drops, on every exit path including unwinding.
/// Entering the scope while already cooked leaves the terminal alone on both ends.
pub struct CookedScope<'a> {
    terminal: &'a mut dyn Terminal,
    restore: bool,
}

impl<'a> CookedScope<'a> {
    pub fn enter(terminal: &'a mut dyn Terminal) -> Result<Self> {
        let restore = terminal.is_raw();
        if restore {
            terminal.disable_raw_mode()?;
        }
        Ok(Self { terminal, restore })
    }

    /// Leaves the scope, surfacing a failure to re-enter raw mode.
    pub fn finish(mut self) -> Result<()> {
        if self.restore {
            self.restore = false;
            self.terminal.enable_raw_mode()?;
        }
        Ok(())
    }
}

impl Drop for CookedScope<'_> {
    fn drop(&mut self) {
        if self.restore {
            if let Err(e) = self.terminal.enable_raw_mode() {
                error!("Failed to restore raw mode: {:#}", e);
            }
        }
    }
}

/// Terminal stand-in for non-interactive sessions: tracks the mode but
/// never touches a device.
#[derive(Debug, Default)]
pub struct Detached {
    raw: bool,
}

impl Terminal for Detached {
    fn is_raw(&self) -> bool {
        self.raw
    }

    fn enter_raw(&mut self) -> Result<()> {
        self.raw = true;
        Ok(())
    }

    fn leave_raw(&mut self) -> Result<()> {
        self.raw = false;
        Ok(())
    }
}

#[cfg(unix)]
pub use self::unix::{PolledInput, RawTerminal};

#[cfg(unix)]
mod unix {
    use super::Terminal;
    use anyhow::{Context, Result, bail};
    use std::io::{self, ErrorKind, Read};
    use std::os::unix::io::{AsRawFd, RawFd};
    use std::time::Duration;

    /// How long a read waits for input before handing control back to the loop.
    pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

    /// termios-backed terminal on a file descriptor (stdin by default).
    pub struct RawTerminal {
        fd: RawFd,
        original: Option<libc::termios>,
        raw: bool,
    }

    impl RawTerminal {
        pub fn stdin() -> Self {
            Self {
                fd: libc::STDIN_FILENO,
                original: None,
                raw: false,
            }
        }

        pub fn is_tty(&self) -> bool {
            unsafe { libc::isatty(self.fd) == 1 }
        }

        fn attributes(&self) -> Result<libc::termios> {
            let mut termios = unsafe { std::mem::zeroed::<libc::termios>() };
            if unsafe { libc::tcgetattr(self.fd, &mut termios) } != 0 {
                return Err(io::Error::last_os_error()).context("tcgetattr failed");
            }
            Ok(termios)
        }

        fn apply(&self, termios: &libc::termios) -> Result<()> {
            if unsafe { libc::tcsetattr(self.fd, libc::TCSANOW, termios) } != 0 {
                return Err(io::Error::last_os_error()).context("tcsetattr failed");
            }
            Ok(())
        }
    }

    impl Terminal for RawTerminal {
        fn is_raw(&self) -> bool {
            self.raw
        }

        fn enter_raw(&mut self) -> Result<()> {
            // Captured once; later enables reuse the first snapshot.
            let original = match self.original {
                Some(original) => original,
                None => {
                    let current = self.attributes()?;
                    self.original = Some(current);
                    current
                }
            };

            let mut raw = original;
            raw.c_lflag &= !(libc::ICANON | libc::ECHO | libc::ISIG | libc::IEXTEN);
            raw.c_iflag &= !(libc::IXON | libc::ICRNL | libc::BRKINT | libc::INPCK | libc::ISTRIP);
            raw.c_cc[libc::VMIN] = 1;
            raw.c_cc[libc::VTIME] = 0;

            self.apply(&raw).context("Failed to enable raw mode")?;
            self.raw = true;
            Ok(())
        }

        fn leave_raw(&mut self) -> Result<()> {
            let Some(original) = self.original else {
                bail!("Raw mode is on but no original terminal settings were captured");
            };
            self.apply(&original).context("Failed to restore terminal settings")?;
            self.raw = false;
            Ok(())
        }
    }

    impl Drop for RawTerminal {
        fn drop(&mut self) {
            if self.raw {
                if let Some(original) = self.original {
                    let _ = self.apply(&original);
                }
            }
        }
    }

    /// Unbuffered reader on a raw descriptor.
    ///
    /// `io::Stdin` buffers internally, which would hide pending bytes from `poll`.
    pub struct FdReader(RawFd);

    impl FdReader {
        pub fn stdin() -> Self {
            Self(libc::STDIN_FILENO)
        }
    }

    impl Read for FdReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = unsafe { libc::read(self.0, buf.as_mut_ptr().cast(), buf.len()) };
            if n < 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(n as usize)
        }
    }

    impl AsRawFd for FdReader {
        fn as_raw_fd(&self) -> RawFd {
            self.0
        }
    }

    /// Reader that waits at most `interval` for data.
    ///
    /// When nothing arrives in time, `read` fails with `WouldBlock` so the
    /// caller can look at its stop flag and try again.
    pub struct PolledInput<R> {
        inner: R,
        interval: Duration,
    }

    impl PolledInput<FdReader> {
        pub fn stdin() -> Self {
            Self::new(FdReader::stdin())
        }
    }

    impl<R: Read + AsRawFd> PolledInput<R> {
        pub fn new(inner: R) -> Self {
            Self {
                inner,
                interval: POLL_INTERVAL,
            }
        }

        fn wait_readable(&self) -> io::Result<bool> {
            let mut fds = libc::pollfd {
                fd: self.inner.as_raw_fd(),
                events: libc::POLLIN,
                revents: 0,
            };
            let timeout = libc::c_int::try_from(self.interval.as_millis()).unwrap_or(libc::c_int::MAX);
            match unsafe { libc::poll(&mut fds, 1, timeout) } {
                n if n < 0 => Err(io::Error::last_os_error()),
                0 => Ok(false),
                // POLLHUP/POLLERR also count: the read reports EOF or the error.
                _ => Ok(true),
            }
        }
    }

    impl<R: Read + AsRawFd> Read for PolledInput<R> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.wait_readable()? {
                return Err(ErrorKind::WouldBlock.into());
            }
            self.inner.read(buf)
        }
    }

}
