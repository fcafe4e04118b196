use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use cfg_if::cfg_if;
use log::debug;
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CopyError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("cannot write copy sequence")]
    Io(#[from] io::Error),
}

pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), CopyError>;
}

cfg_if! {
    if #[cfg(feature = "clipboard")] {
        /// The desktop clipboard.
        #[derive(Debug, Default)]
        pub struct SystemClipboard;

        impl Clipboard for SystemClipboard {
            fn write_text(&mut self, text: &str) -> Result<(), CopyError> {
                let mut clipboard = arboard::Clipboard::new()
                    .map_err(|e| CopyError::Unavailable(e.to_string()))?;
                clipboard
                    .set_text(text)
                    .map_err(|e| CopyError::Unavailable(e.to_string()))?;
                debug!("[Copy] Wrote {} bytes to the system clipboard.", text.len());
                Ok(())
            }
        }
    } else {
        #[derive(Debug, Default)]
        pub struct SystemClipboard;

        impl Clipboard for SystemClipboard {
            fn write_text(&mut self, _text: &str) -> Result<(), CopyError> {
                Err(CopyError::Unavailable("built without clipboard support".to_string()))
            }
        }
    }
}

/// Manual copy through the terminal: emits an OSC 52 sequence that most
/// terminal emulators turn into a clipboard write.
pub struct Osc52Clipboard<W: Write> {
    out: W,
}

impl<W: Write> Osc52Clipboard<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Clipboard for Osc52Clipboard<W> {
    fn write_text(&mut self, text: &str) -> Result<(), CopyError> {
        write!(self.out, "\x1b]52;c;{}\x07", STANDARD.encode(text))?;
        self.out.flush()?;
        debug!("[Copy] Sent {} bytes through OSC 52.", text.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn osc52_sequence_is_base64_encoded() {
        let mut clipboard = Osc52Clipboard::new(Vec::new());
        clipboard.write_text("sudo apt update").unwrap();
        let written = String::from_utf8(clipboard.into_inner()).unwrap();
        assert_eq!(written, "\x1b]52;c;c3VkbyBhcHQgdXBkYXRl\x07");
    }
}
