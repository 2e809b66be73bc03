use nom::branch::alt;
use nom::bytes::complete::{tag, take_till1};
use nom::character::complete::{space0, space1};
use nom::{IResult, Parser};

/// One parsed script line. Numeric arguments are kept raw so a bad
/// number surfaces as a format error when the line executes, not as a
/// mis-parsed key instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Command<'a> {
    Rem(&'a str),
    Repeat(&'a str),
    DefaultDelay(&'a str),
    Delay(&'a str),
    String(&'a str),
    Key(&'a str),
    None,
}

pub fn take_till_no_end<F, Input, Error: nom::error::ParseError<Input>>(
    cond: F,
) -> impl Fn(Input) -> IResult<Input, Input, Error>
where
    Input: nom::InputTakeAtPosition + nom::InputLength + nom::Slice<std::ops::RangeFrom<usize>>,
    F: Fn(<Input as nom::InputTakeAtPosition>::Item) -> bool,
{
    move |i: Input| {
        match i.split_at_position::<_, Error>(|c| cond(c)) {
            Ok(res) => Ok(res),
            Err(e) => match e {
                nom::Err::Incomplete(_) => Ok((i.slice(i.input_len()..), i)),
                nom::Err::Error(_) => Err(e),
                nom::Err::Failure(_) => Err(e),
            },
        }
    }
}

/// Matches `NAME` followed by the rest of the line as its argument.
/// A directive with no argument yields an empty one.
fn directive<'a>(name: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    move |i: &'a str| {
        let (i, _) = tag(name)(i)?;
        if i.is_empty() {
            return Ok((i, ""));
        }
        let (i, _) = space1(i)?;
        take_till_no_end(|c| c == '\n')(i)
    }
}

fn token<'a>(i: &'a str) -> IResult<&'a str, &'a str> {
    take_till1(|c: char| c.is_whitespace())(i)
}

pub fn parse_line<'a>(i: &'a str) -> IResult<&'a str, Command<'a>> {
    let (i, _) = space0(i)?;
    let i = i.trim_end();
    if i.is_empty() || i.starts_with("//") {
        return Ok(("", Command::None));
    }

    alt((
        directive("REM").map(|str| Command::Rem(str)),
        directive("STRING").map(|str| Command::String(str)),
        directive("REPEAT").map(|arg| Command::Repeat(arg)),
        alt((
            directive("DEFAULT_DELAY"),
            directive("DEFAULTDELAY"),
        )).map(|arg| Command::DefaultDelay(arg)),
        directive("DELAY").map(|arg| Command::Delay(arg)),
        token.map(|name| Command::Key(name)),
    ))(i)
}

/// Lazy single pass over a script, yielding 1-based line numbers and the
/// command on each non-blank line.
pub struct Script<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> Script<'a> {
    pub fn new(script: &'a str) -> Script<'a> {
        Script { lines: script.lines().enumerate() }
    }
}

impl<'a> Iterator for Script<'a> {
    type Item = (usize, Command<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        for (i, line) in self.lines.by_ref() {
            match parse_line(line) {
                Ok((_, Command::None)) => continue,
                Ok((_, command)) => return Some((i + 1, command)),
                // non-blank lines always match at least a key token
                Err(_) => continue,
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{parse_line, Command, Script};

    #[test]
    pub fn test() {
        assert!(matches!(parse_line("REM a comment").unwrap().1, Command::Rem("a comment")));

        assert!(matches!(parse_line("STRING a string").unwrap().1, Command::String("a string")));
        assert!(matches!(parse_line("STRING a  b   c").unwrap().1, Command::String("a  b   c")));

        assert!(matches!(parse_line("REPEAT 3").unwrap().1, Command::Repeat("3")));
        assert!(matches!(parse_line("REPEAT abc").unwrap().1, Command::Repeat("abc")));

        assert!(matches!(parse_line("DEFAULT_DELAY 100").unwrap().1, Command::DefaultDelay("100")));
        assert!(matches!(parse_line("DEFAULTDELAY 100").unwrap().1, Command::DefaultDelay("100")));

        assert!(matches!(parse_line("DELAY 500").unwrap().1, Command::Delay("500")));

        assert!(matches!(parse_line("ENTER").unwrap().1, Command::Key("ENTER")));
        assert!(matches!(parse_line("  GUI  ").unwrap().1, Command::Key("GUI")));
        assert!(matches!(parse_line("a").unwrap().1, Command::Key("a")));

        // directive names are case sensitive and must be whole tokens
        assert!(matches!(parse_line("delay 500").unwrap().1, Command::Key("delay")));
        assert!(matches!(parse_line("DELAYED").unwrap().1, Command::Key("DELAYED")));

        assert!(matches!(parse_line("").unwrap().1, Command::None));
        assert!(matches!(parse_line("    \t").unwrap().1, Command::None));
        assert!(matches!(parse_line("// a comment").unwrap().1, Command::None));
    }

    #[test]
    pub fn test_script() {
        let script = "REM hello\n\nSTRING ab\n// skipped\nDELAY 5\n";
        let commands = Script::new(script).collect::<Vec<(usize, Command)>>();

        assert_eq!(commands.len(), 3);
        assert!(matches!(commands[0], (1, Command::Rem("hello"))));
        assert!(matches!(commands[1], (3, Command::String("ab"))));
        assert!(matches!(commands[2], (5, Command::Delay("5"))));
    }
}
