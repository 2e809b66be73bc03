use crate::error::Error;
use crate::tables::{KeyTable, LayoutTable};

/// Script key names that stand in for another name. Resolved
/// iteratively, direct `KEY_` lookups win over aliasing each round.
const ALIASES: &[(&str, &str)] = &[
    ("ESCAPE", "ESC"),
    ("DEL", "DELETE"),
    ("BREAK", "PAUSE"),
    ("CONTROL", "CTRL"),
    ("DOWNARROW", "DOWN"),
    ("UPARROW", "UP"),
    ("LEFTARROW", "LEFT"),
    ("RIGHTARROW", "RIGHT"),
    ("MENU", "APP"),
    ("WINDOWS", "GUI"),
    ("PLAY", "MEDIA_PLAY_PAUSE"),
    ("PAUSE", "MEDIA_PLAY_PAUSE"),
    ("STOP", "MEDIA_STOP"),
    ("MUTE", "MEDIA_MUTE"),
    ("VOLUMEUP", "MEDIA_VOLUME_INC"),
    ("VOLUMEDOWN", "MEDIA_VOLUME_DEC"),
    ("SCROLLLOCK", "SCROLL_LOCK"),
    ("NUMLOCK", "NUM_LOCK"),
    ("CAPSLOCK", "CAPS_LOCK"),
];

/// The class key a character is looked up under in a layout table.
pub fn char_class(c: char) -> String {
    let code = c as u32;
    if code < 0x80 {
        format!("ASCII_{:X}", code)
    } else if code < 0x100 {
        format!("ISO_8859_1_{:X}", code)
    } else {
        format!("UNICODE_{:X}", code)
    }
}

/// Two tier symbol resolution: a layout table turns a character into an
/// ordered list of key names, the default table turns each name into a
/// key code.
pub struct Resolver {
    keys: KeyTable,
    layout: LayoutTable,
}

impl Resolver {
    pub fn new(keys: KeyTable, layout: LayoutTable) -> Resolver {
        Resolver { keys, layout }
    }

    /// Resolve one character to the key codes that type it, in layout
    /// order (modifiers before the base key).
    pub fn resolve_char(&self, c: char) -> Result<Vec<u8>, Error> {
        let class = char_class(c);
        let names = match self.layout.get(&class) {
            Some(names) => names,
            None => return Err(Error::CharacterNotFound(class)),
        };

        let mut codes = Vec::with_capacity(names.len());
        for name in names {
            match self.keys.get(name) {
                Some(code) => codes.push(*code),
                None => return Err(Error::KeyNotFound(name.clone())),
            }
        }
        Ok(codes)
    }

    /// Resolve a named key instruction to its code. Tries `KEY_<NAME>`
    /// directly, then walks the alias table, then falls back to the
    /// token's first character so bare single-character lines still
    /// resolve.
    pub fn resolve_instruction(&self, name: &str) -> Result<u8, Error> {
        let mut key = name.to_uppercase();
        loop {
            if let Some(code) = self.keys.get(&format!("KEY_{}", key)) {
                return Ok(*code);
            }
            match ALIASES.iter().find(|(alias, _)| *alias == key) {
                Some((_, target)) => key = target.to_string(),
                None => break,
            }
        }

        match name.chars().next() {
            Some(c) => {
                let codes = self.resolve_char(c)?;
                match codes.first() {
                    Some(code) => Ok(*code),
                    None => Err(Error::CharacterNotFound(char_class(c))),
                }
            }
            None => Err(Error::KeyNotFound(name.to_string())),
        }
    }
}
