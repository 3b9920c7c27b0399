// Plot label stage: labs(title: "...", x: "...", y: "...")

use super::ast::Labels;
use super::lexer::{string_literal, ws};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::value,
    multi::separated_list0,
    sequence::{delimited, separated_pair},
    IResult,
};

#[derive(Debug, Clone, Copy)]
enum LabelSlot {
    Title,
    X,
    Y,
}

fn parse_slot(input: &str) -> IResult<&str, LabelSlot> {
    alt((
        value(LabelSlot::Title, tag("title")),
        value(LabelSlot::X, tag("x")),
        value(LabelSlot::Y, tag("y")),
    ))(input)
}

/// Label text must be quoted; a repeated slot keeps its last value.
pub fn parse_labs(input: &str) -> IResult<&str, Labels> {
    let (input, _) = ws(tag("labs"))(input)?;
    let (input, entries) = delimited(
        ws(char('(')),
        separated_list0(
            ws(char(',')),
            separated_pair(ws(parse_slot), char(':'), ws(string_literal)),
        ),
        ws(char(')')),
    )(input)?;

    let labels = entries
        .into_iter()
        .fold(Labels::default(), |mut labels, (slot, text)| {
            match slot {
                LabelSlot::Title => labels.title = Some(text),
                LabelSlot::X => labels.x = Some(text),
                LabelSlot::Y => labels.y = Some(text),
            }
            labels
        });

    Ok((input, labels))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_and_axis() {
        let (rest, labels) = parse_labs(r#"labs(title: "Churn by region", x: "Region")"#).unwrap();
        assert_eq!(rest, "");
        assert_eq!(labels.title.as_deref(), Some("Churn by region"));
        assert_eq!(labels.x.as_deref(), Some("Region"));
        assert_eq!(labels.y, None);
    }

    #[test]
    fn test_empty_and_repeated() {
        let (_, labels) = parse_labs("labs()").unwrap();
        assert_eq!(labels, Labels::default());

        let (_, labels) = parse_labs(r#"labs(y: "a", y: "b")"#).unwrap();
        assert_eq!(labels.y.as_deref(), Some("b"));
    }

    #[test]
    fn test_unquoted_or_unknown_fails() {
        assert!(parse_labs("labs(title: Churn)").is_err());
        assert!(parse_labs(r#"labs(caption: "x")"#).is_err());
    }
}
