//! Incremental framing checks over a partially received binary

use wasmparser::{Chunk, Encoding, Parser, Payload};

use super::LoadError;

/// Progress of a [`ModuleFramer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// More bytes are needed to continue
    NeedMoreData,
    /// The module's end was reached
    Complete,
}

/// Walks the section framing of a module as its bytes arrive
///
/// Only headers and section boundaries are checked; full validation is left
/// to compilation. The framer never copies data: every call is handed the
/// whole buffer received so far and resumes at its own offset.
#[derive(Debug, Clone)]
pub struct ModuleFramer {
    parser: Parser,
    offset: usize,
    sections: usize,
    complete: bool,
}

impl Default for ModuleFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleFramer {
    pub fn new() -> Self {
        Self {
            parser: Parser::new(0),
            offset: 0,
            sections: 0,
            complete: false,
        }
    }

    /// Bytes already framed
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of payloads seen so far
    pub fn sections(&self) -> usize {
        self.sections
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Frame as much of `buf` as possible
    ///
    /// `eof` must be true once no further bytes will arrive; a truncated
    /// module is then reported as malformed.
    pub fn advance(&mut self, buf: &[u8], eof: bool) -> Result<Framing, LoadError> {
        while !self.complete {
            let chunk = self
                .parser
                .parse(&buf[self.offset..], eof)
                .map_err(|e| LoadError::Malformed {
                    offset: e.offset(),
                    message: e.message().to_string(),
                })?;

            let (consumed, payload) = match chunk {
                Chunk::NeedMoreData(_) => return Ok(Framing::NeedMoreData),
                Chunk::Parsed { consumed, payload } => (consumed, payload),
            };

            match payload {
                Payload::Version {
                    encoding: Encoding::Component,
                    ..
                } => {
                    return Err(LoadError::Malformed {
                        offset: self.offset,
                        message: "component binaries are not supported".to_string(),
                    });
                }
                Payload::End(_) => self.complete = true,
                _ => self.sections += 1,
            }
            self.offset += consumed;
        }
        Ok(Framing::Complete)
    }
}
