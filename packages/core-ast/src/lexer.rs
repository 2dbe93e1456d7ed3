//! Markup lexer using logos
//!
//! Markup needs two lexers: one for content (text, comments, tag openers)
//! and one for the inside of a start tag. [`tokenize`] switches between them
//! with `morph` and folds the lexemes into [`MarkupToken`]s. Raw text
//! (`script`, `style`) and RCDATA (`textarea`, `title`) bodies are scanned
//! by hand up to their end tag.

use crate::ast::Span;
use crate::error::{ParseIssue, ParseIssueKind};
use crate::tags;
use logos::{Lexer, Logos};

#[derive(Logos, Debug, Clone, PartialEq)]
enum ContentLexeme<'src> {
    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),

    #[token("<!", markup_declaration)]
    Declaration(Declaration<'src>),

    #[regex(r"<[a-zA-Z][^\t\n\f\r />]*", |lex| &lex.slice()[1..])]
    StartTagOpen(&'src str),

    #[regex(r"</[a-zA-Z][^\t\n\f\r />]*", |lex| &lex.slice()[2..])]
    EndTagOpen(&'src str),

    // `<` that does not start a tag
    #[token("<")]
    LessThan,
}

#[derive(Debug, Clone, PartialEq)]
enum Declaration<'src> {
    Comment { value: &'src str, terminated: bool, abrupt: bool },
    Other { body: &'src str, terminated: bool },
}

fn markup_declaration<'src>(lex: &mut Lexer<'src, ContentLexeme<'src>>) -> Declaration<'src> {
    let rest = lex.remainder();

    if let Some(body) = rest.strip_prefix("--") {
        // `<!-->` and `<!--->` end an empty comment right away
        if let Some(close) = [">", "->"].into_iter().find(|close| body.starts_with(close)) {
            lex.bump(2 + close.len());
            return Declaration::Comment {
                value: "",
                terminated: true,
                abrupt: true,
            };
        }

        return match body.find("-->") {
            Some(end) => {
                lex.bump(2 + end + 3);
                Declaration::Comment {
                    value: &body[..end],
                    terminated: true,
                    abrupt: false,
                }
            }
            None => {
                lex.bump(rest.len());
                Declaration::Comment {
                    value: body,
                    terminated: false,
                    abrupt: false,
                }
            }
        };
    }

    match rest.find('>') {
        Some(end) => {
            lex.bump(end + 1);
            Declaration::Other {
                body: &rest[..end],
                terminated: true,
            }
        }
        None => {
            lex.bump(rest.len());
            Declaration::Other {
                body: rest,
                terminated: false,
            }
        }
    }
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\f\r]+")]
enum TagLexeme<'src> {
    #[token(">")]
    Close,

    #[token("/>")]
    SelfClose,

    // Stray solidus between attributes
    #[token("/")]
    Slash,

    #[token("=")]
    Equals,

    #[regex(r#"=[ \t\n\f\r]*[^ \t\n\f\r"'=>][^ \t\n\f\r>]*"#, unquoted)]
    UnquotedValue(&'src str),

    #[regex(r#""[^"]*"?"#, quoted)]
    #[regex(r"'[^']*'?", quoted)]
    QuotedValue(&'src str),

    #[regex(r#"[^ \t\n\f\r"'=>/]+"#, |lex| lex.slice())]
    Name(&'src str),
}

fn quoted<'src>(lex: &mut Lexer<'src, TagLexeme<'src>>) -> &'src str {
    let slice = lex.slice();
    let (quote, inner) = slice.split_at(1);
    inner.strip_suffix(quote).unwrap_or(inner)
}

fn unquoted<'src>(lex: &mut Lexer<'src, TagLexeme<'src>>) -> &'src str {
    lex.slice()[1..].trim_start_matches([' ', '\t', '\n', '\x0c', '\r'])
}

/// Attribute as written, before decoding and typing
#[derive(Debug, Clone, PartialEq)]
pub struct RawAttribute<'src> {
    pub name: &'src str,
    pub value: Option<&'src str>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StartTag<'src> {
    pub name: &'src str,
    pub attributes: Vec<RawAttribute<'src>>,
    pub self_closing: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MarkupToken<'src> {
    /// Character data. `raw` bodies (script, style) are never entity-decoded.
    Text { value: &'src str, raw: bool },
    Comment(&'src str),
    Doctype(&'src str),
    StartTag(StartTag<'src>),
    EndTag(&'src str),
}

/// A token with its byte span
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken<'src> {
    pub token: MarkupToken<'src>,
    pub span: Span,
}

impl<'src> SpannedToken<'src> {
    fn new(token: MarkupToken<'src>, span: Span) -> Self {
        Self { token, span }
    }
}

/// Lex markup into tokens. Never fails; anything malformed is recovered and
/// reported in the returned issues.
pub fn tokenize(source: &str) -> (Vec<SpannedToken<'_>>, Vec<ParseIssue>) {
    let mut tokens = Vec::new();
    let mut issues = Vec::new();
    let mut content = ContentLexeme::lexer(source);

    while let Some(lexeme) = content.next() {
        let span = Span::from(content.span());

        match lexeme {
            Ok(ContentLexeme::Text(value)) => {
                tokens.push(SpannedToken::new(MarkupToken::Text { value, raw: false }, span));
            }
            Ok(ContentLexeme::LessThan) | Err(()) => {
                issues.push(ParseIssue::new(ParseIssueKind::UnescapedLessThan, span));
                let value = &source[span.start..span.end];
                tokens.push(SpannedToken::new(MarkupToken::Text { value, raw: false }, span));
            }
            Ok(ContentLexeme::Declaration(Declaration::Comment {
                value,
                terminated,
                abrupt,
            })) => {
                if !terminated {
                    issues.push(ParseIssue::new(ParseIssueKind::EofInComment, span));
                }
                if abrupt {
                    issues.push(ParseIssue::new(ParseIssueKind::AbruptEmptyComment, span));
                }
                tokens.push(SpannedToken::new(MarkupToken::Comment(value), span));
            }
            Ok(ContentLexeme::Declaration(Declaration::Other { body, terminated })) => {
                if !terminated {
                    issues.push(ParseIssue::new(ParseIssueKind::EofInTag, span));
                }
                let is_doctype = body
                    .get(..7)
                    .is_some_and(|prefix| prefix.eq_ignore_ascii_case("doctype"));
                let token = if is_doctype {
                    MarkupToken::Doctype(body[7..].trim())
                } else {
                    // `<!foo>` and `<![CDATA[...]]>` become bogus comments
                    MarkupToken::Comment(body)
                };
                tokens.push(SpannedToken::new(token, span));
            }
            Ok(ContentLexeme::EndTagOpen(name)) => {
                // Anything between the name and `>` is ignored
                let rest = content.remainder();
                let skip = match rest.find('>') {
                    Some(close) => close + 1,
                    None => {
                        issues.push(ParseIssue::new(
                            ParseIssueKind::EofInTag,
                            Span::new(span.start, source.len()),
                        ));
                        rest.len()
                    }
                };
                content.bump(skip);
                let end = offset_of(source, content.remainder());
                tokens.push(SpannedToken::new(
                    MarkupToken::EndTag(name),
                    Span::new(span.start, end),
                ));
            }
            Ok(ContentLexeme::StartTagOpen(name)) => {
                let mut inside = content.morph::<TagLexeme>();
                let (attributes, self_closing, closed) = lex_attributes(&mut inside, &mut issues);
                let end = offset_of(source, inside.remainder());
                content = inside.morph();

                if !closed {
                    issues.push(ParseIssue::new(
                        ParseIssueKind::EofInTag,
                        Span::new(span.start, end),
                    ));
                }

                tokens.push(SpannedToken::new(
                    MarkupToken::StartTag(StartTag {
                        name,
                        attributes,
                        self_closing,
                    }),
                    Span::new(span.start, end),
                ));

                let lowered = name.to_ascii_lowercase();
                let raw = tags::is_raw_text(&lowered);
                if raw || tags::is_rcdata(&lowered) {
                    let rest = content.remainder();
                    let len = raw_text_len(rest, &lowered);
                    if len > 0 {
                        tokens.push(SpannedToken::new(
                            MarkupToken::Text {
                                value: &rest[..len],
                                raw,
                            },
                            Span::new(end, end + len),
                        ));
                        content.bump(len);
                    }
                }
            }
        }
    }

    (tokens, issues)
}

/// Returns the attributes, whether the tag ended with `/>`, and whether it
/// was closed at all before the end of input.
fn lex_attributes<'src>(
    lexer: &mut Lexer<'src, TagLexeme<'src>>,
    issues: &mut Vec<ParseIssue>,
) -> (Vec<RawAttribute<'src>>, bool, bool) {
    let mut attributes: Vec<RawAttribute<'src>> = Vec::new();
    let mut awaiting_value = false;

    while let Some(lexeme) = lexer.next() {
        let span = Span::from(lexer.span());

        match lexeme {
            Ok(TagLexeme::Close) => return (attributes, false, true),
            Ok(TagLexeme::SelfClose) => return (attributes, true, true),
            Ok(TagLexeme::Slash) => awaiting_value = false,
            Ok(TagLexeme::Name(name)) => {
                attributes.push(RawAttribute {
                    name,
                    value: None,
                    span,
                });
                awaiting_value = false;
            }
            Ok(TagLexeme::Equals) => match attributes.last_mut() {
                Some(last) if last.value.is_none() => {
                    last.value = Some("");
                    last.span = last.span.join(span);
                    awaiting_value = true;
                }
                _ => issues.push(ParseIssue::new(ParseIssueKind::UnexpectedCharacter, span)),
            },
            Ok(TagLexeme::QuotedValue(value)) => match attributes.last_mut() {
                Some(last) if awaiting_value => {
                    last.value = Some(value);
                    last.span = last.span.join(span);
                    awaiting_value = false;
                }
                _ => issues.push(ParseIssue::new(ParseIssueKind::UnexpectedCharacter, span)),
            },
            Ok(TagLexeme::UnquotedValue(value)) => match attributes.last_mut() {
                Some(last) if last.value.is_none() => {
                    last.value = Some(value);
                    last.span = last.span.join(span);
                }
                _ => issues.push(ParseIssue::new(ParseIssueKind::UnexpectedCharacter, span)),
            },
            Err(()) => issues.push(ParseIssue::new(ParseIssueKind::UnexpectedCharacter, span)),
        }
    }

    (attributes, false, false)
}

/// Length of a raw text body: up to `</tag` followed by a delimiter, or the
/// whole input when the end tag is missing.
fn raw_text_len(rest: &str, tag: &str) -> usize {
    let bytes = rest.as_bytes();
    let mut from = 0;

    while let Some(found) = rest[from..].find("</") {
        let at = from + found;
        let name_end = at + 2 + tag.len();
        let matches_tag = rest
            .get(at + 2..name_end)
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(tag));
        if matches_tag
            && matches!(
                bytes.get(name_end),
                None | Some(b'>' | b'/' | b' ' | b'\t' | b'\n' | b'\r' | b'\x0c')
            )
        {
            return at;
        }
        from = at + 2;
    }

    rest.len()
}

fn offset_of(source: &str, remainder: &str) -> usize {
    source.len() - remainder.len()
}
