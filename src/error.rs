use std::{fmt::Display, io};

/// Everything that can abort an encode. The whole operation is
/// all-or-nothing, so none of these are recovered from mid-stream.
#[derive(Debug)]
pub enum Error {
    Config(String),
    Format(String),
    CharacterNotFound(String),
    KeyNotFound(String),
    Io(io::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Config(msg) => f.write_str(&format!("Config Error: {}.", msg)),
            Error::Format(arg) => f.write_str(&format!("Format Error: \"{}\" is not a valid integer argument.", arg)),
            Error::CharacterNotFound(code) => f.write_str(&format!("Character not found: no layout entry for \"{}\".", code)),
            Error::KeyNotFound(name) => f.write_str(&format!("Key not found: \"{}\" is not in the default key table.", name)),
            Error::Io(e) => f.write_str(&format!("IO Error: {}.", e)),
        }
    }
}

impl Error {
    pub fn to_err_msg(&self, line: &usize) -> String {
        format!("Error on line {}, {}", line, self)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        Error::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;

    #[test]
    pub fn test() {
        let e = Error::Format("abc".to_string());
        assert_eq!(e.to_err_msg(&3), "Error on line 3, Format Error: \"abc\" is not a valid integer argument.");

        assert!(matches!(Error::from(std::io::Error::from(std::io::ErrorKind::NotFound)), Error::Io(_)));
    }
}
