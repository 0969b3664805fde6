use super::{strip_authorization_scheme, SignatureParams, AUTHORIZATION_SCHEME};
use logos::{Lexer, Logos, Span};
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Malformed `Signature` header
///
/// The span points at the offending token of the input passed to [`parse`]
#[derive(Debug, Diagnostic, Error)]
#[error("Malformed signature header")]
#[diagnostic(
    code(ap_signature::header::parse),
    help("expected a comma-separated list of key=\"value\" pairs")
)]
pub struct ParseError {
    #[label("unexpected token")]
    span: SourceSpan,
}

impl ParseError {
    /// Byte span of the offending token
    #[must_use]
    pub fn span(&self) -> SourceSpan {
        self.span
    }
}

#[derive(Debug, Logos)]
#[logos(skip r"[ \t]+")]
enum TokenTy {
    /// Parameter names and unquoted values (`created=1402170695`)
    #[regex(r"[A-Za-z0-9_\-]+")]
    Word,

    #[token("=")]
    Equals,

    #[regex(r#""[^"]*""#)]
    Quoted,

    #[token(",")]
    Comma,
}

#[derive(Debug)]
struct Token {
    pub ty: TokenTy,
    pub span: Span,
}

impl Token {
    pub fn parse(input: &str) -> impl Iterator<Item = Result<Token, Span>> + '_ {
        Lexer::<'_, TokenTy>::new(input)
            .spanned()
            .map(|(ty, span)| match ty {
                Ok(ty) => Ok(Token { ty, span }),
                Err(()) => Err(span),
            })
    }
}

macro_rules! ensure {
    ($self:expr, $value:expr, $pattern:pat) => {{
        let value = match $value {
            Some(Ok(value)) => value,
            Some(Err(span)) => return Some(Err($self.fail(span))),
            None => {
                let end = $self.input.len();
                return Some(Err($self.fail(end..end)));
            }
        };

        if !matches!(value.ty, $pattern) {
            return Some(Err($self.fail(value.span)));
        }

        value
    }};
}

struct ParseIter<'a, I> {
    /// Stream of lexed tokens
    inner: I,

    /// Reference to the original input that was fed to the lexer
    input: &'a str,

    /// Length of the stripped `Signature ` prefix, added to error spans
    offset: usize,

    /// Marker whether we encountered any error or illegal token
    ///
    /// If we did, the iterator will stop yielding any results
    is_broken: bool,
}

impl<I> ParseIter<'_, I> {
    fn fail(&mut self, span: Span) -> ParseError {
        self.is_broken = true;
        ParseError {
            span: (self.offset + span.start..self.offset + span.end).into(),
        }
    }
}

impl<'a, I> Iterator for ParseIter<'a, I>
where
    I: Iterator<Item = Result<Token, Span>>,
{
    type Item = Result<(&'a str, &'a str), ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_broken {
            return None;
        }

        let key = match self.inner.next()? {
            Ok(Token {
                ty: TokenTy::Word,
                span,
            }) => span,
            Ok(Token { span, .. }) | Err(span) => return Some(Err(self.fail(span))),
        };
        ensure!(self, self.inner.next(), TokenTy::Equals);
        let value = ensure!(self, self.inner.next(), TokenTy::Quoted | TokenTy::Word);

        if let Some(next) = self.inner.next() {
            ensure!(self, Some(next), TokenTy::Comma);
        }

        let key = &self.input[key];
        let value = self.input[value.span].trim_matches('"');

        Some(Ok((key, value)))
    }
}

/// Parse a `Signature` header (or the value of an `Authorization: Signature` header) into its parameters
///
/// Quoted values are lexed as a single token, so commas inside them (as in a quoted list)
/// don't split the parameter. Unknown parameters are kept, duplicates resolve to the last occurrence.
#[inline]
pub fn parse(input: &str) -> Result<SignatureParams<'_>, ParseError> {
    let (offset, params) = match strip_authorization_scheme(input) {
        Some(params) => (AUTHORIZATION_SCHEME.len(), params),
        None => (0, input),
    };

    ParseIter {
        inner: Token::parse(params),
        input: params,
        offset,
        is_broken: false,
    }
    .collect()
}
