use std::{fs, path::Path};

use log::{debug, warn};

use crate::error::Error;
use crate::parser::{Command, Script};
use crate::resolver::Resolver;
use crate::tables;

/// Mutable state for one pass over a script. `last` holds the previous
/// emitting instruction so REPEAT can re-issue it; it is consumed and
/// cleared by the repeat, so repeats never nest.
struct EncoderState<'a> {
    out: Vec<u8>,
    default_delay: u32,
    last: Option<Command<'a>>,
}

/// Compiles a script into the payload byte stream. Key events are
/// `(code, 0x00)` pairs, delays are chains of `(0x00, value)` chunks
/// and STRING characters are raw resolved bytes.
pub struct Encoder {
    resolver: Resolver,
}

impl Encoder {
    pub fn new(resolver: Resolver) -> Encoder {
        Encoder { resolver }
    }

    /// Load both symbol tables and build an encoder. Either table
    /// failing to parse leaves nothing behind.
    pub fn from_sources(default_src: &str, layout_src: &str) -> Result<Encoder, Error> {
        let (keys, layout) = tables::load(default_src, layout_src)?;
        Ok(Encoder::new(Resolver::new(keys, layout)))
    }

    /// Encode a whole script. All or nothing: any error aborts with the
    /// 1-based line it happened on and no bytes escape.
    pub fn encode(&self, script: &str) -> Result<Vec<u8>, (usize, Error)> {
        let mut state = EncoderState { out: Vec::new(), default_delay: 0, last: None };

        for (i, command) in Script::new(script) {
            self.step(command, &mut state).map_err(|e| (i, e))?;
        }

        debug!("encoded {} bytes", state.out.len());
        Ok(state.out)
    }

    /// Read a script file, encode it and write the payload. The
    /// destination is only touched once the whole script has encoded.
    pub fn encode_to_file(&self, script: &Path, dest: &Path) -> Result<usize, Error> {
        let input = fs::read_to_string(script)?;
        let payload = self.encode(&input).map_err(|(_, e)| e)?;
        fs::write(dest, &payload)?;
        Ok(payload.len())
    }

    fn step<'a>(&self, command: Command<'a>, state: &mut EncoderState<'a>) -> Result<(), Error> {
        match command {
            Command::None | Command::Rem(_) => (),
            Command::Repeat(arg) => {
                let count = parse_arg(arg)?;
                if count == 0 {
                    return Err(Error::Format(arg.to_string()));
                }
                match state.last.take() {
                    Some(last) => {
                        for _ in 0..count {
                            self.emit(&last, state)?;
                        }
                    }
                    None => warn!("REPEAT with no previous instruction, ignoring"),
                }
            }
            Command::DefaultDelay(arg) => state.default_delay = parse_arg(arg)?,
            command => {
                self.emit(&command, state)?;
                state.last = Some(command);
            }
        }
        Ok(())
    }

    fn emit(&self, command: &Command, state: &mut EncoderState) -> Result<(), Error> {
        match command {
            Command::Delay(arg) => {
                push_delay(&mut state.out, parse_arg(arg)?);
                // explicit delays never get the implicit one appended
                return Ok(());
            }
            Command::String(text) => {
                for c in text.chars() {
                    let codes = self.resolver.resolve_char(c)?;
                    state.out.extend_from_slice(&codes);
                }
            }
            Command::Key(name) => {
                let code = self.resolver.resolve_instruction(name)?;
                state.out.push(code);
                state.out.push(0x00);
            }
            Command::Rem(_) | Command::Repeat(_) | Command::DefaultDelay(_) | Command::None => return Ok(()),
        }

        if state.default_delay > 0 {
            push_delay(&mut state.out, state.default_delay);
        }
        Ok(())
    }
}

fn parse_arg(arg: &str) -> Result<u32, Error> {
    arg.trim().parse().map_err(|_| Error::Format(arg.to_string()))
}

/// Chunked delay encoding: a `0x00` marker then up to 255ms, chained
/// until the whole delay is spent. Zero emits nothing.
fn push_delay(out: &mut Vec<u8>, mut ms: u32) {
    while ms > 0 {
        out.push(0x00);
        if ms > 255 {
            out.push(0xFF);
            ms -= 255;
        } else {
            out.push(ms as u8);
            ms = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::encoder::{push_delay, Encoder};
    use crate::error::Error;
    use crate::tables::{builtin_layout, DEFAULT_KEYS};

    fn encoder() -> Encoder {
        Encoder::from_sources(DEFAULT_KEYS, builtin_layout("us").unwrap()).unwrap()
    }

    fn delay_bytes(ms: u32) -> Vec<u8> {
        let mut out = Vec::new();
        push_delay(&mut out, ms);
        out
    }

    #[test]
    pub fn test_delay_chunks() {
        assert_eq!(delay_bytes(0), Vec::<u8>::new());
        assert_eq!(delay_bytes(5), vec![0x00, 0x05]);
        assert_eq!(delay_bytes(255), vec![0x00, 0xFF]);
        assert_eq!(delay_bytes(256), vec![0x00, 0xFF, 0x00, 0x01]);
        assert_eq!(delay_bytes(600), vec![0x00, 0xFF, 0x00, 0xFF, 0x00, 0x5A]);

        // a multiple of 255 ends on a full chunk
        assert_eq!(delay_bytes(510), vec![0x00, 0xFF, 0x00, 0xFF]);

        for ms in [1u32, 254, 255, 256, 1000, 65535] {
            let out = delay_bytes(ms);
            assert_eq!(out.len() / 2, (ms as usize + 254) / 255);
            let sum: u32 = out.chunks(2).map(|chunk| chunk[1] as u32).sum();
            assert_eq!(sum, ms);
        }
    }

    #[test]
    pub fn test_key_events() {
        let encoder = encoder();

        assert_eq!(encoder.encode("ENTER").unwrap(), vec![40, 0x00]);
        assert_eq!(encoder.encode("GUI r").unwrap(), vec![227, 0x00]);
        assert_eq!(encoder.encode("a").unwrap(), vec![4, 0x00]);
    }

    #[test]
    pub fn test_string_raw_bytes() {
        let encoder = encoder();

        // one raw byte per resolved code, no key event framing
        assert_eq!(encoder.encode("STRING aB").unwrap(), vec![4, 225, 5]);
        assert_eq!(encoder.encode("STRING hi there").unwrap().len(), 8);
    }

    #[test]
    pub fn test_repeat() {
        let encoder = encoder();

        // the first emission plus three repeats
        assert_eq!(
            encoder.encode("a\nREPEAT 3").unwrap(),
            vec![4, 0, 4, 0, 4, 0, 4, 0]
        );

        // REPEAT consumes the pending instruction, it does not nest
        assert_eq!(
            encoder.encode("a\nREPEAT 2\nREPEAT 2").unwrap(),
            vec![4, 0, 4, 0, 4, 0]
        );

        // a leading REPEAT has nothing to re-issue
        assert_eq!(encoder.encode("REPEAT 5\na").unwrap(), vec![4, 0]);

        assert!(matches!(encoder.encode("a\nREPEAT abc"), Err((2, Error::Format(_)))));
        assert!(matches!(encoder.encode("a\nREPEAT 0"), Err((2, Error::Format(_)))));
    }

    #[test]
    pub fn test_default_delay() {
        let encoder = encoder();

        // key event, implicit delay, then the explicit delay with no
        // implicit one appended after it
        assert_eq!(
            encoder.encode("DEFAULT_DELAY 10\nA\nDELAY 5").unwrap(),
            vec![0x04, 0x00, 0x00, 0x0A, 0x00, 0x05]
        );

        assert_eq!(encoder.encode("DEFAULTDELAY 10\nENTER").unwrap(), vec![40, 0, 0, 10]);

        // repeated instructions each get the implicit delay
        assert_eq!(
            encoder.encode("DEFAULT_DELAY 1\na\nREPEAT 2").unwrap(),
            vec![4, 0, 0, 1, 4, 0, 0, 1, 4, 0, 0, 1]
        );

        assert!(matches!(encoder.encode("DEFAULT_DELAY x"), Err((1, Error::Format(_)))));
    }

    #[test]
    pub fn test_comments_and_errors() {
        let encoder = encoder();

        assert_eq!(encoder.encode("REM nothing here\n// or here\n").unwrap(), Vec::<u8>::new());

        assert!(matches!(encoder.encode("STRING é"), Err((1, Error::CharacterNotFound(_)))));
        assert!(matches!(encoder.encode("a\nDELAY ms"), Err((2, Error::Format(_)))));
    }

    #[test]
    pub fn test_no_partial_file() {
        let encoder = encoder();
        let dir = tempfile::tempdir().unwrap();

        let script = dir.path().join("script.txt");
        let dest = dir.path().join("inject.bin");

        std::fs::write(&script, "a\nREPEAT abc\n").unwrap();
        assert!(encoder.encode_to_file(&script, &dest).is_err());
        assert!(!dest.exists());

        std::fs::write(&script, "STRING ab\nENTER\n").unwrap();
        let written = encoder.encode_to_file(&script, &dest).unwrap();
        assert_eq!(written, 4);
        assert_eq!(std::fs::read(&dest).unwrap(), vec![4, 5, 40, 0]);
    }
}
