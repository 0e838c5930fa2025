use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_while1},
    character::complete::{alphanumeric1, char, multispace0},
    combinator::{map, opt, rest},
    multi::many0,
    sequence::{delimited, preceded},
    IResult,
};

pub fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// `\name`, returning `name`
pub fn command_name(input: &str) -> IResult<&str, &str> {
    preceded(char('\\'), alt((alphanumeric1, tag("?"))))(input)
}

/// A double-quoted string or a bare word
pub fn argument(input: &str) -> IResult<&str, String> {
    preceded(
        multispace0,
        alt((
            map(delimited(char('"'), opt(is_not("\"")), char('"')), |s: Option<&str>| {
                s.unwrap_or_default().to_string()
            }),
            map(take_while1(|c: char| !c.is_whitespace()), str::to_string),
        )),
    )(input)
}

pub fn arguments(input: &str) -> IResult<&str, Vec<String>> {
    many0(argument)(input)
}

/// Rest of the line, trimmed; `None` when nothing is left
pub fn remainder(input: &str) -> IResult<&str, Option<String>> {
    map(rest, |s: &str| {
        let s = s.trim();
        (!s.is_empty()).then(|| s.to_string())
    })(input)
}
