// Chart command parser

use super::ast::ChartCommand;
use super::lexer::{column_ref, ws};
use crate::ir::{AggregationMode, ChartType};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{map, opt, value},
    multi::separated_list0,
    sequence::{preceded, terminated},
    IResult,
};

#[derive(Debug)]
enum ChartArg {
    X(String),
    Y(String),
    Aggregation(AggregationMode),
}

pub fn parse_chart_type(input: &str) -> IResult<&str, ChartType> {
    alt((
        value(ChartType::StackedBar, alt((tag("stackedBar"), tag("stacked_bar")))),
        value(ChartType::Scatter, tag("scatter")),
        value(ChartType::Radar, tag("radar")),
        value(ChartType::Bar, tag("bar")),
    ))(input)
}

pub fn parse_aggregation(input: &str) -> IResult<&str, AggregationMode> {
    alt((
        value(AggregationMode::Count, tag("count")),
        value(AggregationMode::Sum, tag("sum")),
        value(
            AggregationMode::Average,
            alt((tag("average"), tag("avg"), tag("mean"))),
        ),
    ))(input)
}

fn parse_arg(input: &str) -> IResult<&str, ChartArg> {
    alt((
        map(preceded(ws(tag("x:")), ws(column_ref)), ChartArg::X),
        map(preceded(ws(tag("y:")), ws(column_ref)), ChartArg::Y),
        map(
            preceded(ws(alt((tag("aggregation:"), tag("agg:")))), ws(parse_aggregation)),
            ChartArg::Aggregation,
        ),
    ))(input)
}

/// Parse a chart command
/// Format: radar, radar(), bar(x: Region), stackedBar(x: Region, y: "Monthly Charges", agg: sum)
pub fn parse_chart_command(input: &str) -> IResult<&str, ChartCommand> {
    let (input, chart_type) = ws(parse_chart_type)(input)?;

    // Once the argument list is opened it must parse through the closing paren
    let (input, open) = opt(ws(char('(')))(input)?;
    let (input, args) = if open.is_some() {
        terminated(separated_list0(ws(char(',')), parse_arg), ws(char(')')))(input)?
    } else {
        (input, Vec::new())
    };

    let mut command = ChartCommand::new(chart_type);
    for arg in args {
        match arg {
            ChartArg::X(x) => command.x = Some(x),
            ChartArg::Y(y) => command.y = Some(y),
            ChartArg::Aggregation(a) => command.aggregation = Some(a),
        }
    }

    Ok((input, command))
}
