//! Console driver.
//!
//! The command-line front end has no screen to redraw. Rendering prints the
//! App's notice whenever it changes, one line per notice.

use std::io::Write;

use ciphernet_app::{App, Driver, Notice, NoticeKind};

/// Driver that writes notices to a stream (stderr in the binary).
pub struct ConsoleDriver<W: Write + Send> {
    out: W,
    shown: Option<Notice>,
}

impl<W: Write + Send> ConsoleDriver<W> {
    /// Driver writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out, shown: None }
    }

    /// The stream notices were written to.
    pub fn output(&self) -> &W {
        &self.out
    }
}

impl<W: Write + Send> Driver for ConsoleDriver<W> {
    type Error = std::io::Error;

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        let Some(notice) = app.notice() else {
            return Ok(());
        };
        if self.shown.as_ref() == Some(notice) {
            return Ok(());
        }

        let label = match notice.kind {
            NoticeKind::Info => "info",
            NoticeKind::Error => "error",
        };
        writeln!(self.out, "{label}: {}", notice.text)?;
        self.shown = Some(notice.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prints_each_notice_once() {
        let mut driver = ConsoleDriver::new(Vec::new());
        let mut app = App::new();

        driver.render(&app).unwrap();
        let _ = app.register("");
        driver.render(&app).unwrap();
        driver.render(&app).unwrap();

        let printed = String::from_utf8(driver.output().clone()).unwrap();
        assert_eq!(printed, "error: Username is required.\n");
    }
}
