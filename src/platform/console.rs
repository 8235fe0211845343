//! Console helpers: hiding the text cursor and watching the terminal for an
//! escape keypress without blocking the render loop.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::fd::AsFd;
use std::path::{Path, PathBuf};

use nix::fcntl::{FcntlArg, OFlag, fcntl};
use nix::sys::termios::{LocalFlags, SetArg, SpecialCharacterIndices, Termios, tcgetattr, tcsetattr};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::tasks::slideshow::CancelSource;

pub const DEFAULT_CONSOLE: &str = "/dev/console";

const ESC: u8 = 0x1b;
const HIDE_CURSOR: &[u8] = b"\x1b[?25l";
const SHOW_CURSOR: &[u8] = b"\x1b[?25h";

/// Hides the console cursor until dropped.
#[derive(Debug)]
pub struct CursorGuard {
    console: File,
    path: PathBuf,
}

impl CursorGuard {
    /// # Errors
    /// [`Error::Setup`] when the console cannot be opened or written.
    pub fn hide(path: &Path) -> Result<Self> {
        let mut console = OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(|err| Error::setup(format!("failed to open {}", path.display()), err))?;
        console
            .write_all(HIDE_CURSOR)
            .map_err(|err| Error::setup(format!("failed to hide cursor on {}", path.display()), err))?;
        debug!(console = %path.display(), "cursor hidden");
        Ok(Self {
            console,
            path: path.to_path_buf(),
        })
    }
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        if let Err(err) = self.console.write_all(SHOW_CURSOR) {
            warn!(console = %self.path.display(), error = %err, "failed to restore cursor");
        }
    }
}

/// Non-canonical, non-blocking view of stdin that reports lone escape presses.
///
/// The previous terminal mode is restored on drop.
pub struct TerminalKeys {
    saved: Termios,
    saved_flags: OFlag,
}

impl TerminalKeys {
    /// # Errors
    /// [`Error::Setup`] when stdin is not a terminal or cannot be reconfigured.
    pub fn claim() -> Result<Self> {
        let stdin = io::stdin();
        let saved = tcgetattr(stdin.as_fd())
            .map_err(|errno| Error::setup("failed to read terminal attributes", errno))?;

        let mut raw = saved.clone();
        raw.local_flags.remove(LocalFlags::ICANON | LocalFlags::ECHO);
        raw.control_chars[SpecialCharacterIndices::VMIN as usize] = 0;
        raw.control_chars[SpecialCharacterIndices::VTIME as usize] = 0;
        tcsetattr(stdin.as_fd(), SetArg::TCSANOW, &raw)
            .map_err(|errno| Error::setup("failed to switch terminal to key mode", errno))?;

        let current = fcntl(stdin.as_fd(), FcntlArg::F_GETFL)
            .map_err(|errno| Error::setup("F_GETFL failed on stdin", errno))?;
        let saved_flags = OFlag::from_bits_retain(current);
        let mut flags = saved_flags;
        flags.insert(OFlag::O_NONBLOCK);
        fcntl(stdin.as_fd(), FcntlArg::F_SETFL(flags))
            .map_err(|errno| Error::setup("F_SETFL failed on stdin", errno))?;

        Ok(Self { saved, saved_flags })
    }

    fn drain(&mut self) -> Result<Vec<u8>> {
        let mut pending = Vec::new();
        let mut chunk = [0u8; 64];
        let mut stdin = io::stdin().lock();
        loop {
            match stdin.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => pending.extend_from_slice(&chunk[..n]),
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => break,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(Error::Io(err)),
            }
        }
        Ok(pending)
    }
}

impl CancelSource for TerminalKeys {
    fn cancel_requested(&mut self) -> Result<bool> {
        let pending = self.drain()?;
        Ok(contains_lone_escape(&pending))
    }
}

impl Drop for TerminalKeys {
    fn drop(&mut self) {
        let stdin = io::stdin();
        if let Err(errno) = fcntl(stdin.as_fd(), FcntlArg::F_SETFL(self.saved_flags)) {
            warn!(error = %errno, "failed to restore stdin flags");
        }
        if let Err(errno) = tcsetattr(stdin.as_fd(), SetArg::TCSANOW, &self.saved) {
            warn!(error = %errno, "failed to restore terminal attributes");
        }
    }
}

/// True when `bytes` holds an escape that is not the lead-in of a longer
/// sequence (arrow keys, Alt chords).
fn contains_lone_escape(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .enumerate()
        .any(|(i, &b)| b == ESC && matches!(bytes.get(i + 1), None | Some(&ESC)))
}
