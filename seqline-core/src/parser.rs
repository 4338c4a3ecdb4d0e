//! Parser for the sequence diagram notation
//!
//! One statement per line: `title:`, `lifeline:`/`ll:`, `actor:`, messages
//! and notes. A line starting with `//` is a comment, `/* */` block comments
//! may span lines, and any statement text may be quoted with `"` to span
//! several lines. Unquoted statement text runs to the end of the line, so
//! `//` and `/*` inside it are plain text.

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_until, take_while1},
    character::complete::{char, one_of, space0, space1},
    combinator::{opt, value},
    multi::separated_list1,
    sequence::{delimited, preceded},
    IResult, Parser,
};

use crate::ast::*;

/// Parse error
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    #[error("parse error at line {line}: {message}")]
    Syntax { line: usize, message: String },
}

impl ParseError {
    fn at(line: usize, message: impl Into<String>) -> Self {
        ParseError::Syntax {
            line: line + 1,
            message: message.into(),
        }
    }
}

/// Statement shape, before text resolution and participant interning
enum Stmt<'a> {
    Title,
    Participant {
        id: &'a str,
        alias: Option<&'a str>,
        kind: ParticipantKind,
    },
    Message {
        source: &'a str,
        target: &'a str,
        arrow: Arrow,
        activates: bool,
        deactivates: bool,
        has_text: bool,
    },
    Note {
        location: NoteLocation,
        targets: Vec<&'a str>,
    },
}

/// Parse a complete diagram
pub fn parse(input: &str) -> Result<Diagram, ParseError> {
    let input = strip_block_comments(input)?;
    let lines: Vec<&str> = input.lines().collect();

    let mut diagram = Diagram::default();
    let mut i = 0;

    while i < lines.len() {
        let stmt_line = i;
        let trimmed = lines[i].trim();
        i += 1;

        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }

        let (rest, stmt) = match parse_statement(trimmed) {
            Ok(parsed) => parsed,
            Err(_) => {
                return Err(ParseError::at(
                    stmt_line,
                    format!("unrecognized statement `{trimmed}`"),
                ));
            }
        };

        match stmt {
            Stmt::Title => {
                let text = collect_text(rest, &lines, &mut i)
                    .ok_or_else(|| ParseError::at(stmt_line, "unterminated quoted text"))?;
                diagram.title = Some(text);
            }
            Stmt::Participant { id, alias, kind } => {
                if !rest.trim().is_empty() {
                    return Err(ParseError::at(
                        stmt_line,
                        format!("unexpected input `{}`", rest.trim()),
                    ));
                }
                diagram.get_or_add_participant(id, alias, kind);
            }
            Stmt::Message {
                source,
                target,
                arrow,
                activates,
                deactivates,
                has_text,
            } => {
                let text = if has_text {
                    collect_text(rest, &lines, &mut i)
                        .ok_or_else(|| ParseError::at(stmt_line, "unterminated quoted text"))?
                } else {
                    if !rest.trim().is_empty() {
                        return Err(ParseError::at(
                            stmt_line,
                            format!("unexpected input `{}`", rest.trim()),
                        ));
                    }
                    String::new()
                };
                let source = diagram.get_or_add_participant(source, None, ParticipantKind::Lifeline);
                let target = diagram.get_or_add_participant(target, None, ParticipantKind::Lifeline);
                diagram.elements.push(Element::Message {
                    source,
                    target,
                    text,
                    arrow,
                    activates,
                    deactivates,
                });
            }
            Stmt::Note { location, targets } => {
                let valid = match location {
                    NoteLocation::Over => targets.len() <= 2,
                    _ => targets.len() == 1,
                };
                if !valid {
                    return Err(ParseError::at(
                        stmt_line,
                        "a note spans one participant, or two with `over`",
                    ));
                }
                let text = collect_text(rest, &lines, &mut i)
                    .ok_or_else(|| ParseError::at(stmt_line, "unterminated quoted text"))?;
                let targets = targets
                    .into_iter()
                    .map(|t| diagram.get_or_add_participant(t, None, ParticipantKind::Lifeline))
                    .collect();
                diagram.elements.push(Element::Note {
                    location,
                    targets,
                    text,
                });
            }
        }
    }

    Ok(diagram)
}

/// Remove `/* */` comments, keeping newlines so line numbers stay stable.
///
/// Quoted text is opaque to the stripper: a `/*` between quotes is literal
/// content, matching how quoted text is tokenized before comments.
fn strip_block_comments(input: &str) -> Result<String, ParseError> {
    let mut out = String::with_capacity(input.len());
    let bytes = input.as_bytes();
    let mut in_quotes = false;
    let mut seg_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                in_quotes = !in_quotes;
                i += 1;
            }
            b'/' if !in_quotes && bytes.get(i + 1) == Some(&b'*') => {
                out.push_str(&input[seg_start..i]);
                match input[i + 2..].find("*/") {
                    Some(end) => {
                        let inside = &input[i + 2..i + 2 + end];
                        out.extend(inside.chars().filter(|&c| c == '\n'));
                        i += end + 4;
                        seg_start = i;
                    }
                    None => {
                        let line = out.chars().filter(|&c| c == '\n').count();
                        return Err(ParseError::at(line, "unterminated block comment"));
                    }
                }
            }
            _ => i += 1,
        }
    }
    out.push_str(&input[seg_start..]);
    Ok(out)
}

/// Resolve the text part of a statement.
///
/// Unquoted text runs to the end of the line. Quoted text may continue over
/// the following lines until the closing quote; `i` is advanced past any
/// consumed continuation lines. Returns `None` when the quote never closes.
fn collect_text(rest: &str, lines: &[&str], i: &mut usize) -> Option<String> {
    let rest = rest.trim();
    let Some(quoted) = rest.strip_prefix('"') else {
        return Some(rest.to_string());
    };

    if let Some(end) = quoted.find('"') {
        return Some(quoted[..end].to_string());
    }

    let mut parts = vec![quoted.to_string()];
    while *i < lines.len() {
        let line = lines[*i];
        *i += 1;
        if let Some(end) = line.find('"') {
            parts.push(line[..end].to_string());
            return Some(parts.join("\n"));
        }
        parts.push(line.to_string());
    }
    None
}

fn parse_statement(input: &str) -> IResult<&str, Stmt<'_>> {
    alt((
        parse_title_stmt,
        parse_participant_stmt,
        parse_note_stmt,
        parse_message_stmt,
    ))
    .parse(input)
}

fn parse_title_stmt(input: &str) -> IResult<&str, Stmt<'_>> {
    let (input, _) = (tag_no_case("title"), space0, char(':')).parse(input)?;
    Ok((input, Stmt::Title))
}

/// `lifeline: id`, `ll: id`, `actor: id`, each with an optional `as alias`
fn parse_participant_stmt(input: &str) -> IResult<&str, Stmt<'_>> {
    let (input, kind) = alt((
        value(ParticipantKind::Lifeline, tag_no_case("lifeline")),
        value(ParticipantKind::Lifeline, tag_no_case("ll")),
        value(ParticipantKind::Actor, tag_no_case("actor")),
    ))
    .parse(input)?;
    let (input, _) = (space0, char(':'), space0).parse(input)?;
    let (input, id) = parse_name(input)?;
    let (input, alias) = opt(preceded(
        (space1, tag_no_case("as"), space1),
        parse_name,
    ))
    .parse(input)?;
    Ok((input, Stmt::Participant { id, alias, kind }))
}

/// `note left of a: text`, `note right of a: text`, `note over a[, b]: text`
fn parse_note_stmt(input: &str) -> IResult<&str, Stmt<'_>> {
    let (input, _) = (tag_no_case("note"), space1).parse(input)?;
    let (input, location) = alt((
        value(
            NoteLocation::LeftOf,
            (tag_no_case("left"), space1, tag_no_case("of")),
        ),
        value(
            NoteLocation::RightOf,
            (tag_no_case("right"), space1, tag_no_case("of")),
        ),
        value(NoteLocation::Over, tag_no_case("over")),
    ))
    .parse(input)?;
    let (input, _) = space1.parse(input)?;
    let (input, targets) =
        separated_list1((space0, char(','), space0), parse_name).parse(input)?;
    let (input, _) = (space0, char(':')).parse(input)?;
    Ok((input, Stmt::Note { location, targets }))
}

/// `a -> b: text`, with `-`/`--` line, `>`/`>>` head and `+`/`-` modifier
fn parse_message_stmt(input: &str) -> IResult<&str, Stmt<'_>> {
    let (input, source) = parse_name(input)?;
    let (input, _) = space0.parse(input)?;
    let (input, arrow) = parse_arrow(input)?;
    let (input, modifier) = opt(one_of("+-")).parse(input)?;
    let (input, _) = space0.parse(input)?;
    let (input, target) = parse_name(input)?;
    let (input, colon) = opt((space0, char(':'))).parse(input)?;

    Ok((
        input,
        Stmt::Message {
            source,
            target,
            arrow,
            activates: modifier == Some('+'),
            deactivates: modifier == Some('-'),
            has_text: colon.is_some(),
        },
    ))
}

fn parse_arrow(input: &str) -> IResult<&str, Arrow> {
    alt((
        value(Arrow::DASHED_OPEN, tag("-->>")),
        value(Arrow::DASHED_CLOSED, tag("-->")),
        value(Arrow::SOLID_OPEN, tag("->>")),
        value(Arrow::SOLID_CLOSED, tag("->")),
    ))
    .parse(input)
}

/// Quoted name, or an identifier of alphanumerics and underscores
fn parse_name(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_until("\""), char('"')),
        take_while1(|c: char| c.is_alphanumeric() || c == '_'),
    ))
    .parse(input)
}
