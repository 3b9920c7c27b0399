// Pipeline parser: chart command followed by optional `| labs(...)` stages

use super::ast::{ChartSpec, Labels};
use super::chart::parse_chart_command;
use super::labels::parse_labs;
use super::lexer::ws;
use nom::{
    bytes::complete::tag,
    combinator::eof,
    multi::many0,
    sequence::preceded,
    IResult,
};

/// Parse a complete configuration string
/// Format: chart | labs(...) | ...
pub fn parse_chart_spec(input: &str) -> IResult<&str, ChartSpec> {
    let (input, chart) = parse_chart_command(input)?;
    let (input, stages) = many0(preceded(ws(tag("|")), parse_labs))(input)?;

    // Consume trailing whitespace and ensure end of input
    let (input, _) = ws(eof)(input)?;

    let mut labels = Labels::default();
    for stage in stages {
        labels.merge(stage);
    }

    Ok((input, ChartSpec { chart, labels }))
}
