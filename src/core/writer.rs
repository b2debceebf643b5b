//! Prompt writer
//!
//! `PromptWriter` wraps any `Write` sink and re-displays a prompt (and an
//! optional status icon) after every write that ends in `\n`. The next write
//! starts with `\r`, so it overwrites the prompt instead of following it.
//!
//! ```text
//! write("hello\n")  ->  hello\n $
//! write("world\n")  ->  \r world\n $
//! ```
//!
//! All I/O on the sink and all trailer updates happen under one mutex, so
//! payloads from different threads never interleave and a concurrent writer
//! sees either the old or the new prompt in full.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace};

use super::error::{PromptError, Result};
use super::trailer::{Trailer, CURSOR_RESET, DEFAULT_PROMPT, LINE_TERMINATOR};

/// State guarded by the writer lock
struct Inner<W> {
    sink: W,
    trailer: Trailer,
}

/// Output decorator that keeps a prompt below the last printed line
pub struct PromptWriter<W: Write> {
    inner: Mutex<Inner<W>>,
    /// A prompt was printed after a line and the next write must overwrite it
    pending_reset: AtomicBool,
}

impl<W: Write> PromptWriter<W> {
    /// Create a writer with no prompt and no icon (plain passthrough)
    pub fn new(sink: W) -> Self {
        Self {
            inner: Mutex::new(Inner {
                sink,
                trailer: Trailer::new(),
            }),
            pending_reset: AtomicBool::new(false),
        }
    }

    /// Create a writer showing `prompt`, or `DEFAULT_PROMPT` if `None`
    pub fn with_prompt(sink: W, prompt: Option<&str>) -> Self {
        let writer = Self::new(sink);
        writer.set_prompt(Some(prompt.unwrap_or(DEFAULT_PROMPT)));
        writer
    }

    fn lock(&self) -> MutexGuard<'_, Inner<W>> {
        // The guarded state is plain bytes; a panic mid-write leaves nothing to repair.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the prompt. `None` disables it. Does not write anything.
    pub fn set_prompt(&self, prompt: Option<&str>) -> &Self {
        let bytes = Trailer::encode_prompt(prompt);
        self.lock().trailer.set_prompt(bytes);
        self
    }

    /// Replace the status icon. `None` disables it. A trailing space is
    /// added when missing. Does not write anything.
    ///
    /// Calling this and then writing from two threads can still show the
    /// other thread's icon; use [`print_prompt_with_icon`] when the icon and
    /// the redraw must go together.
    ///
    /// [`print_prompt_with_icon`]: Self::print_prompt_with_icon
    pub fn set_status_icon(&self, icon: Option<&str>) -> &Self {
        let bytes = Trailer::encode_icon(icon);
        self.lock().trailer.set_icon(bytes);
        self
    }

    /// Current prompt, decoded lossily
    pub fn prompt(&self) -> String {
        String::from_utf8_lossy(self.lock().trailer.prompt()).into_owned()
    }

    pub fn prompt_bytes(&self) -> Vec<u8> {
        self.lock().trailer.prompt().to_vec()
    }

    /// Current status icon including its trailing space, decoded lossily
    pub fn status_icon(&self) -> String {
        String::from_utf8_lossy(self.lock().trailer.icon()).into_owned()
    }

    pub fn status_icon_bytes(&self) -> Vec<u8> {
        self.lock().trailer.icon().to_vec()
    }

    /// Redraw icon and prompt at the start of the current line.
    ///
    /// Best effort: sink errors are logged and dropped.
    pub fn print_prompt(&self) -> &Self {
        let mut inner = self.lock();
        if let Err(e) = Self::redraw(&mut inner) {
            debug!("Prompt redraw failed: {}", e);
        }
        self
    }

    /// Set the status icon and redraw in one critical section, so no other
    /// writer can emit a trailer with a different icon in between.
    pub fn print_prompt_with_icon(&self, icon: &str) -> &Self {
        let bytes = Trailer::encode_icon(Some(icon));
        let mut inner = self.lock();
        inner.trailer.set_icon(bytes);
        if let Err(e) = Self::redraw(&mut inner) {
            debug!("Prompt redraw failed: {}", e);
        }
        self
    }

    fn redraw(inner: &mut Inner<W>) -> io::Result<()> {
        let Inner { sink, trailer } = inner;
        sink.write_all(&[CURSOR_RESET])?;
        trailer.write_to(sink)?;
        sink.flush()
    }

    /// Single choke point for every write entry point
    fn write_payload(&self, buf: &[u8]) -> Result<usize> {
        let Some(&last) = buf.last() else {
            return Ok(0);
        };

        {
            let mut inner = self.lock();
            if self.pending_reset.swap(false, Ordering::Relaxed) {
                inner.sink.write_all(&[CURSOR_RESET]).map_err(PromptError::Sink)?;
            }
            inner.sink.write_all(buf).map_err(PromptError::Sink)?;
        }

        if last == LINE_TERMINATOR {
            let mut inner = self.lock();
            let Inner { sink, trailer } = &mut *inner;
            if trailer.is_empty() {
                sink.flush().map_err(PromptError::Trailer)?;
                return Ok(buf.len());
            }

            // Set before emitting: even a partial trailer should be overwritten next time.
            self.pending_reset.store(true, Ordering::Relaxed);
            trace!("Emitting prompt trailer ({} bytes)", trailer.len());
            trailer.write_to(sink).map_err(PromptError::Trailer)?;
            sink.flush().map_err(PromptError::Trailer)?;
        } else {
            // Unlocked on purpose: losing this race only costs an extra `\r`.
            self.pending_reset.store(false, Ordering::Relaxed);
        }

        Ok(buf.len())
    }

    fn flush_sink(&self) -> io::Result<()> {
        self.lock().sink.flush()
    }

    /// Flush and hand back the sink. Dropping it closes it.
    pub fn close(self) -> io::Result<W> {
        let mut inner = self.inner.into_inner().unwrap_or_else(PoisonError::into_inner);
        inner.sink.flush()?;
        Ok(inner.sink)
    }

    /// Release the wrapper without any I/O
    pub fn into_inner(self) -> W {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .sink
    }
}

impl<W: Write> Write for PromptWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.write_payload(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_sink()
    }
}

impl<W: Write> Write for &PromptWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.write_payload(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_sink()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    /// In-memory sink that can be inspected while the writer owns a clone
    #[derive(Clone, Default)]
    struct SharedSink {
        bytes: Arc<Mutex<Vec<u8>>>,
        flushes: Arc<Mutex<usize>>,
    }

    impl SharedSink {
        fn contents(&self) -> Vec<u8> {
            self.bytes.lock().unwrap().clone()
        }

        fn text(&self) -> String {
            String::from_utf8(self.contents()).unwrap()
        }

        fn flush_count(&self) -> usize {
            *self.flushes.lock().unwrap()
        }
    }

    impl Write for SharedSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.bytes.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            *self.flushes.lock().unwrap() += 1;
            Ok(())
        }
    }

    /// Sink that accepts `budget` bytes and fails afterwards
    struct FailingSink {
        written: Vec<u8>,
        budget: usize,
        fail_flush: bool,
    }

    impl FailingSink {
        fn new(budget: usize) -> Self {
            Self {
                written: Vec::new(),
                budget,
                fail_flush: false,
            }
        }
    }

    impl Write for FailingSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"));
            }
            let n = buf.len().min(self.budget);
            self.written.extend_from_slice(&buf[..n]);
            self.budget -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            if self.fail_flush {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"));
            }
            Ok(())
        }
    }

    #[test]
    fn test_end_to_end_example() {
        let sink = SharedSink::default();
        let mut writer = PromptWriter::new(sink.clone());
        writer.set_prompt(Some("$ "));

        writer.write_all(b"hello\n").unwrap();
        assert_eq!(sink.text(), "hello\n$ ");

        writer.write_all(b"world\n").unwrap();
        assert_eq!(sink.text(), "hello\n$ \rworld\n$ ");
    }

    #[test]
    fn test_passthrough_without_prompt_or_icon() {
        let sink = SharedSink::default();
        let mut writer = PromptWriter::new(sink.clone());

        writer.write_all(b"one\n").unwrap();
        writer.write_all(b"two").unwrap();
        writer.write_all(b"\nthree\n").unwrap();
        assert_eq!(sink.text(), "one\ntwo\nthree\n");
    }

    #[test]
    fn test_icon_precedes_prompt() {
        let sink = SharedSink::default();
        let mut writer = PromptWriter::new(sink.clone());
        writer.set_prompt(Some("> ")).set_status_icon(Some("⏳"));

        writer.write_all(b"working\n").unwrap();
        assert_eq!(sink.text(), "working\n⏳ > ");
        assert_eq!(sink.flush_count(), 1);
    }

    #[test]
    fn test_no_trailer_without_terminator() {
        let sink = SharedSink::default();
        let mut writer = PromptWriter::with_prompt(sink.clone(), Some("$ "));

        writer.write_all(b"partial").unwrap();
        writer.write_all(b" line").unwrap();
        assert_eq!(sink.text(), "partial line");

        writer.write_all(b"\n").unwrap();
        assert_eq!(sink.text(), "partial line\n$ ");
    }

    #[test]
    fn test_cursor_reset_placement() {
        let sink = SharedSink::default();
        let mut writer = PromptWriter::with_prompt(sink.clone(), Some("$ "));

        writer.write_all(b"a\n").unwrap();
        writer.write_all(b"b").unwrap();
        writer.write_all(b"c").unwrap();
        writer.write_all(b"d\n").unwrap();
        writer.write_all(b"e").unwrap();

        // One reset after each trailer, none between plain writes
        assert_eq!(sink.text(), "a\n$ \rbcd\n$ \re");
    }

    #[test]
    fn test_terminator_only_checked_on_last_byte() {
        let sink = SharedSink::default();
        let mut writer = PromptWriter::with_prompt(sink.clone(), Some("$ "));

        writer.write_all(b"line1\nline2").unwrap();
        assert_eq!(sink.text(), "line1\nline2");
    }

    #[test]
    fn test_zero_length_write_is_noop() {
        let sink = SharedSink::default();
        let mut writer = PromptWriter::with_prompt(sink.clone(), Some("$ "));

        assert_eq!(writer.write(&[]).unwrap(), 0);
        assert!(sink.contents().is_empty());

        writer.write_all(b"x\n").unwrap();
        assert_eq!(writer.write(&[]).unwrap(), 0);
        // Pending reset survives the empty write
        writer.write_all(b"y").unwrap();
        assert_eq!(sink.text(), "x\n$ \ry");
    }

    #[test]
    fn test_single_byte_writes() {
        let sink = SharedSink::default();
        let mut writer = PromptWriter::with_prompt(sink.clone(), Some("% "));

        for b in b"hi\nyo\n" {
            writer.write_all(&[*b]).unwrap();
        }
        assert_eq!(sink.text(), "hi\n% \ryo\n% ");
    }

    #[test]
    fn test_write_fmt_through_shared_reference() {
        let sink = SharedSink::default();
        let writer = PromptWriter::with_prompt(sink.clone(), Some("$ "));

        let mut out = &writer;
        writeln!(out, "Text entered: {}", "abc").unwrap();
        assert_eq!(sink.text(), "Text entered: abc\n$ ");
    }

    #[test]
    fn test_default_prompt() {
        let writer = PromptWriter::with_prompt(Vec::new(), None);
        assert_eq!(writer.prompt(), DEFAULT_PROMPT);

        let writer = PromptWriter::new(Vec::new());
        assert_eq!(writer.prompt(), "");
        assert!(writer.status_icon_bytes().is_empty());
    }

    #[test]
    fn test_prompt_round_trip() {
        let writer = PromptWriter::new(Vec::new());
        for text in ["$ ", ">>> ", "123> ", "データ> ", "🥰 "] {
            writer.set_prompt(Some(text));
            assert_eq!(writer.prompt(), text);
            assert_eq!(writer.prompt_bytes(), text.as_bytes());
        }

        writer.set_prompt(None);
        assert_eq!(writer.prompt(), "");
    }

    #[test]
    fn test_status_icon_normalized() {
        let writer = PromptWriter::new(Vec::new());
        writer.set_status_icon(Some("💥"));
        let first = writer.status_icon_bytes();
        writer.set_status_icon(Some("💥 "));
        assert_eq!(writer.status_icon_bytes(), first);
        assert_eq!(writer.status_icon(), "💥 ");

        writer.set_status_icon(None);
        assert!(writer.status_icon_bytes().is_empty());
    }

    #[test]
    fn test_print_prompt() {
        let sink = SharedSink::default();
        let writer = PromptWriter::with_prompt(sink.clone(), Some("$ "));
        writer.set_status_icon(Some("🧪"));

        writer.print_prompt();
        assert_eq!(sink.text(), "\r🧪 $ ");
        assert_eq!(sink.flush_count(), 1);
    }

    #[test]
    fn test_print_prompt_with_icon() {
        let sink = SharedSink::default();
        let writer = PromptWriter::with_prompt(sink.clone(), Some("$ "));

        let icons = ["💀", "☠", "⏳", "🇨🇱"];
        for (i, icon) in icons.iter().enumerate() {
            writer.print_prompt_with_icon(&format!("{} {}", i, icon));
        }

        let text = sink.text();
        let redraws: Vec<&str> = text.split('\r').skip(1).collect();
        assert_eq!(redraws.len(), icons.len());
        for (i, redraw) in redraws.iter().enumerate() {
            assert_eq!(*redraw, format!("{} {} $ ", i, icons[i]));
        }
        assert_eq!(writer.status_icon(), "3 🇨🇱 ");
    }

    #[test]
    fn test_print_prompt_swallows_errors() {
        let writer = PromptWriter::with_prompt(FailingSink::new(0), Some("$ "));
        writer.print_prompt().print_prompt_with_icon("!");
        assert_eq!(writer.status_icon(), "! ");
    }

    #[test]
    fn test_payload_error_propagates() {
        let mut writer = PromptWriter::with_prompt(FailingSink::new(0), Some("$ "));
        let err = writer.write(b"hello\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_trailer_error_propagates_and_keeps_reset() {
        // Room for the payload and one prompt byte
        let mut writer = PromptWriter::with_prompt(FailingSink::new(7), Some("$ "));
        let err = writer.write(b"hello\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(writer.pending_reset.load(Ordering::Relaxed));

        let sink = writer.into_inner();
        assert_eq!(sink.written, b"hello\n$".to_vec());
    }

    #[test]
    fn test_flush_error_on_trailer() {
        let mut sink = FailingSink::new(usize::MAX);
        sink.fail_flush = true;
        let mut writer = PromptWriter::with_prompt(sink, Some("$ "));

        assert!(writer.write(b"no newline").is_ok());
        assert!(writer.write(b"newline\n").is_err());
        assert!(writer.flush().is_err());
    }

    #[test]
    fn test_close_flushes_and_returns_sink() {
        let sink = SharedSink::default();
        let mut writer = PromptWriter::with_prompt(sink.clone(), Some("$ "));
        writer.write_all(b"bye").unwrap();

        let returned = writer.close().unwrap();
        assert_eq!(returned.text(), "bye");
        assert_eq!(sink.flush_count(), 1);
    }

    #[test]
    fn test_concurrent_writes_do_not_interleave() {
        const THREADS: usize = 8;
        const LINES: usize = 200;

        let sink = SharedSink::default();
        let writer = Arc::new(PromptWriter::with_prompt(sink.clone(), Some("123> ")));
        writer.set_status_icon(Some("#"));

        thread::scope(|s| {
            for t in 0..THREADS {
                let writer = Arc::clone(&writer);
                s.spawn(move || {
                    let mut out = &*writer;
                    for i in 0..LINES {
                        let line = format!("<thread {:02} line {:04} payload>\n", t, i);
                        out.write_all(line.as_bytes()).unwrap();
                    }
                });
            }
        });

        // Strip resets and trailers; what remains must be whole payloads.
        // Extra resets are allowed: the non-terminator flag update is unlocked.
        let text = sink.text().replace('\r', "").replace("# 123> ", "");
        let mut lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), THREADS * LINES);

        lines.sort_unstable();
        let mut expected: Vec<String> = (0..THREADS)
            .flat_map(|t| (0..LINES).map(move |i| format!("<thread {:02} line {:04} payload>", t, i)))
            .collect();
        expected.sort_unstable();
        assert_eq!(lines, expected);
    }

    #[test]
    fn test_prompt_change_is_never_torn() {
        let sink = SharedSink::default();
        let writer = Arc::new(PromptWriter::with_prompt(sink.clone(), Some("AAAA> ")));

        thread::scope(|s| {
            let setter = Arc::clone(&writer);
            s.spawn(move || {
                for i in 0..500 {
                    setter.set_prompt(Some(if i % 2 == 0 { "BBBB> " } else { "AAAA> " }));
                }
            });
            let w = Arc::clone(&writer);
            s.spawn(move || {
                let mut out = &*w;
                for _ in 0..500 {
                    out.write_all(b"x\n").unwrap();
                }
            });
        });

        let text = sink.text();
        for chunk in text.split('\r').filter(|c| !c.is_empty()) {
            assert!(chunk == "x\nAAAA> " || chunk == "x\nBBBB> ", "torn output: {:?}", chunk);
        }
    }
}
