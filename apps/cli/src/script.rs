//! Allocation script parser
//!
//! One command per line; `#` starts a comment, blank lines are skipped.
//!
//! ```text
//! alloc  <name> <size>
//! free   <name>
//! resize <name> <size>
//! write  <name> <byte>     # byte is decimal or 0x-prefixed hex
//! dump
//! check
//! ```

use anyhow::{Context, Result, bail};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Alloc { name: String, size: usize },
    Free { name: String },
    Resize { name: String, size: usize },
    Write { name: String, byte: u8 },
    Dump,
    Check,
}

/// A parsed command with its 1-based source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub number: usize,
    pub command: Command,
}

pub fn parse(source: &str) -> Result<Vec<Line>> {
    let mut lines = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let number = index + 1;
        let text = raw.split_once('#').map_or(raw, |(code, _)| code).trim();
        if text.is_empty() {
            continue;
        }
        let command = parse_command(text).with_context(|| format!("line {number}: `{text}`"))?;
        lines.push(Line { number, command });
    }
    Ok(lines)
}

fn parse_command(text: &str) -> Result<Command> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let command = match words.as_slice() {
        ["alloc", name, size] => Command::Alloc {
            name: (*name).to_string(),
            size: parse_size(size)?,
        },
        ["free", name] => Command::Free {
            name: (*name).to_string(),
        },
        ["resize", name, size] => Command::Resize {
            name: (*name).to_string(),
            size: parse_size(size)?,
        },
        ["write", name, byte] => Command::Write {
            name: (*name).to_string(),
            byte: parse_byte(byte)?,
        },
        ["dump"] => Command::Dump,
        ["check"] => Command::Check,
        [verb, ..] => bail!("unknown command or wrong arguments for `{verb}`"),
        [] => bail!("empty command"),
    };
    Ok(command)
}

fn parse_size(text: &str) -> Result<usize> {
    text.parse()
        .with_context(|| format!("invalid size `{text}`"))
}

fn parse_byte(text: &str) -> Result<u8> {
    let parsed = match text.strip_prefix("0x") {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.with_context(|| format!("invalid byte `{text}`"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_script() {
        let source = "\
# warm-up
alloc a 16
write a 0x2a   # fill
resize a 24

free a
dump
check
";
        let lines = parse(source).unwrap();
        let commands: Vec<_> = lines.iter().map(|l| l.command.clone()).collect();
        assert_eq!(
            commands,
            vec![
                Command::Alloc {
                    name: "a".into(),
                    size: 16
                },
                Command::Write {
                    name: "a".into(),
                    byte: 0x2a
                },
                Command::Resize {
                    name: "a".into(),
                    size: 24
                },
                Command::Free { name: "a".into() },
                Command::Dump,
                Command::Check,
            ]
        );
        assert_eq!(lines[0].number, 2);
        assert_eq!(lines[3].number, 6);
    }

    #[test]
    fn test_errors_name_the_line() {
        let err = parse("alloc a 16\nalloc b lots\n").unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));

        assert!(parse("frobnicate").is_err());
        assert!(parse("free").is_err());
        assert!(parse("write a 256").is_err());
    }
}
