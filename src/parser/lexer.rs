// Shared tokens for the configuration mini-language

use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, multispace0},
    combinator::map,
    sequence::delimited,
    IResult,
};

/// Wrap a parser so it ignores surrounding whitespace
pub fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Bare column name: letters (any script), digits, `_` and `.`
pub fn identifier(input: &str) -> IResult<&str, String> {
    map(
        take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '.'),
        |s: &str| s.to_string(),
    )(input)
}

/// Double-quoted string, no escapes. `""` is allowed.
pub fn string_literal(input: &str) -> IResult<&str, String> {
    map(
        delimited(char('"'), take_while(|c: char| c != '"'), char('"')),
        |s: &str| s.to_string(),
    )(input)
}

/// A column reference: quoted for names with spaces, bare otherwise
pub fn column_ref(input: &str) -> IResult<&str, String> {
    alt((string_literal, identifier))(input)
}
