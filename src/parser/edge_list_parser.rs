//! Parser for weighted graphs in a DIMACS like edge list format.
//! A file starts with the header `p edge <kind> <n> <edges> <0|1>`
//! where the last number tells whether the graph is directed.
//! Each edge then has its own line `e <start> <end> <weight>`,
//! undirected edges only once. Lines starting with `c` are comments.
//! Repeated edges are skipped with a warning, the first weight wins.

use std::{io::BufRead, str::FromStr};

use crate::{
    graph::{GraphError, VertexIndex, Weight, WeightedGraph},
    Error,
};

use super::{Input, ParseError, ParseResult};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
struct Header {
    size: usize,
    /// Number of edge lines announced, only used as a hint.
    edges: usize,
    directed: bool,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum Line {
    Comment,
    Header(Header),
    Edge(VertexIndex, VertexIndex, Weight),
}

fn parse_unsigned(input: Input<'_>) -> ParseResult<'_, u64> {
    use nom::{character::complete::digit1, combinator::map_res};

    map_res(digit1, |digits: &str| digits.parse::<u64>())(input)
}

fn parse_signed<T: FromStr>(input: Input<'_>) -> ParseResult<'_, T> {
    use nom::{
        character::complete::{char, digit1},
        combinator::{map_res, opt, recognize},
        sequence::pair,
    };

    map_res(recognize(pair(opt(char('-')), digit1)), |number: &str| {
        number.parse::<T>()
    })(input)
}

fn parse_comment(input: Input<'_>) -> ParseResult<'_, Line> {
    use nom::{
        character::complete::{char, not_line_ending},
        combinator::value,
        error::context,
        sequence::pair,
    };

    context(
        "Comment line",
        value(Line::Comment, pair(char('c'), not_line_ending)),
    )(input)
}

fn parse_header(input: Input<'_>) -> ParseResult<'_, Header> {
    use nom::{
        bytes::complete::tag,
        character::complete::{alphanumeric1, char, one_of, space1},
        combinator::verify,
        error::context,
        sequence::tuple,
    };

    let graph_size = verify(parse_unsigned, |size: &u64| {
        *size <= VertexIndex::MAX as u64
    });
    let mut header = context(
        "Header line",
        tuple((
            char('p'),
            space1,
            tag("edge"),
            space1,
            alphanumeric1,
            space1,
            context("Graph size", graph_size),
            space1,
            context("Number of edges", parse_unsigned),
            space1,
            context("Directed flag", one_of("01")),
        )),
    );

    let (rest, (_, _, _, _, _, _, size, _, edges, _, directed)) = header(input)?;
    Ok((
        rest,
        Header {
            size: size as usize,
            edges: edges as usize,
            directed: directed == '1',
        },
    ))
}

fn parse_edge(input: Input<'_>) -> ParseResult<'_, (VertexIndex, VertexIndex, Weight)> {
    use nom::{
        character::complete::{char, space1},
        error::context,
        sequence::{pair, preceded, tuple},
    };

    context(
        "Edge line",
        tuple((
            preceded(pair(char('e'), space1), parse_signed::<VertexIndex>),
            preceded(space1, parse_signed::<VertexIndex>),
            preceded(space1, parse_signed::<Weight>),
        )),
    )(input)
}

fn parse_line(input: Input<'_>) -> ParseResult<'_, Line> {
    use nom::{
        branch::alt,
        character::complete::space0,
        combinator::{all_consuming, map},
        sequence::terminated,
    };

    let edge_line = map(parse_edge, |(start, end, weight)| {
        Line::Edge(start, end, weight)
    });
    all_consuming(terminated(
        alt((parse_comment, map(parse_header, Line::Header), edge_line)),
        space0,
    ))(input)
}

fn malformed(line: usize, input: Input<'_>, error: nom::Err<ParseError<'_>>) -> Error {
    let reason = match error {
        nom::Err::Error(verbose) | nom::Err::Failure(verbose) => {
            nom::error::convert_error(input, verbose)
        }
        nom::Err::Incomplete(_) => unreachable!(),
    };
    Error::MalformedInput { line, reason }
}

pub fn parse_edge_list_input<B: BufRead>(input: B) -> Result<WeightedGraph, Error> {
    let mut graph: Option<WeightedGraph> = None;
    let mut announced_edges = 0;
    let mut edge_lines = 0;
    let mut line_number = 0;

    for line in input.lines() {
        let line = line?;
        line_number += 1;

        let content = line.trim_end();
        if content.is_empty() {
            continue;
        }

        let (_, parsed) =
            parse_line(content).map_err(|error| malformed(line_number, content, error))?;

        match parsed {
            Line::Comment => (),
            Line::Header(header) => {
                if graph.is_some() {
                    return Err(Error::MalformedInput {
                        line: line_number,
                        reason: "Found more than one header line".to_string(),
                    });
                }
                announced_edges = header.edges;
                let new_graph = WeightedGraph::try_new(header.size, header.directed).map_err(
                    |error| Error::MalformedInput {
                        line: line_number,
                        reason: format!("Graph with {} vertices: {}", header.size, error),
                    },
                )?;
                graph = Some(new_graph);
            }
            Line::Edge(start, end, weight) => {
                let graph = graph.as_mut().ok_or_else(|| Error::MalformedInput {
                    line: line_number,
                    reason: "Edge found before the header line".to_string(),
                })?;
                edge_lines += 1;
                match graph.add_edge(start, end, weight) {
                    Ok(()) => (),
                    // First weight wins.
                    Err(GraphError::AlreadyExists(..)) => tracing::warn!(
                        line = line_number,
                        start,
                        end,
                        weight,
                        "Edge listed twice, line skipped"
                    ),
                    Err(source) => {
                        return Err(Error::EdgeRejected {
                            line: line_number,
                            source,
                        })
                    }
                }
            }
        }
    }

    let graph = graph.ok_or(Error::MalformedInput {
        line: line_number,
        reason: "No header line found".to_string(),
    })?;

    if edge_lines != announced_edges {
        tracing::warn!(
            announced = announced_edges,
            found = edge_lines,
            "Header announces a different number of edges"
        );
    }

    Ok(graph)
}

#[cfg(test)]
mod test {
    use std::io::BufReader;

    use super::*;

    fn parse_str(input: &str) -> Result<WeightedGraph, Error> {
        parse_edge_list_input(BufReader::new(input.as_bytes()))
    }

    #[test]
    fn test_parse_header() {
        let (_, header) = parse_header("p edge directed 12 40 1").unwrap();
        assert_eq!(
            Header {
                size: 12,
                edges: 40,
                directed: true
            },
            header
        );

        let (_, header) = parse_header("p  edge undirected\t3 2 0").unwrap();
        assert!(!header.directed);
        assert_eq!(3, header.size);

        assert!(parse_header("p edge directed 12 40 2").is_err());
        assert!(parse_header("p edge directed -12 40 1").is_err());
        assert!(parse_header("p graph directed 12 40 1").is_err());
        assert!(parse_header("p edge directed 3000000000 1 1").is_err());
    }

    #[test]
    fn test_parse_edge() {
        let (_, edge) = parse_edge("e 4 7 -12").unwrap();
        assert_eq!((4, 7, -12), edge);

        let (_, edge) = parse_edge("e\t0   1 9000000000").unwrap();
        assert_eq!((0, 1, 9_000_000_000), edge);

        let (_, edge) = parse_edge("e -1 2 0").unwrap();
        assert_eq!((-1, 2, 0), edge);

        assert!(parse_edge("e 4 7").is_err());
        assert!(parse_edge("e 4 x 2").is_err());
        assert!(parse_edge("e 4 7 -").is_err());
        assert!(parse_edge("e 3000000000 1 1").is_err());
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(Line::Comment, parse_line("c some comment").unwrap().1);
        assert_eq!(Line::Comment, parse_line("c").unwrap().1);
        assert_eq!(Line::Edge(1, 2, 3), parse_line("e 1 2 3   ").unwrap().1);
        assert!(parse_line("e 1 2 3 4").is_err());
        assert!(parse_line("x 1 2 3").is_err());
    }

    #[test]
    fn test_parse_edge_list_input() -> Result<(), Error> {
        let input = "c weighted triangle\r
p edge undirected 3 3 0\r
\r
e 0 1 5\r
e 1 2 5\r
c the heavy edge
e 2 0 9
";
        let parsed = parse_str(input)?;

        let mut expected = WeightedGraph::new(3, false);
        expected.add_edge(0, 1, 5)?;
        expected.add_edge(1, 2, 5)?;
        expected.add_edge(0, 2, 9)?;

        assert_eq!(expected, parsed);
        Ok(())
    }

    #[test]
    fn test_written_graph_parses() -> Result<(), Error> {
        let mut graph = WeightedGraph::new(5, true);
        graph.add_edge(4, 0, 2)?;
        graph.add_edge(0, 4, 3)?;
        graph.add_edge(2, 3, -1)?;

        let parsed = parse_str(&graph.to_string())?;
        assert_eq!(graph, parsed);
        Ok(())
    }

    #[test]
    fn test_malformed_input() {
        let missing_header = parse_str("c nothing here\ne 0 1 1\n");
        assert!(matches!(
            missing_header,
            Err(Error::MalformedInput { line: 2, .. })
        ));

        let empty = parse_str("c only comments\n\n");
        assert!(matches!(empty, Err(Error::MalformedInput { line: 2, .. })));

        let two_headers = parse_str("p edge directed 2 0 1\np edge directed 2 0 1\n");
        assert!(matches!(
            two_headers,
            Err(Error::MalformedInput { line: 2, .. })
        ));

        let broken_edge = parse_str("p edge directed 2 1 1\nc\ne 0 one 1\n");
        assert!(matches!(
            broken_edge,
            Err(Error::MalformedInput { line: 3, .. })
        ));
    }

    #[test]
    fn test_symmetric_listing() -> Result<(), Error> {
        let parsed = parse_str("p edge undirected 2 2 0\ne 0 1 1\ne 1 0 1\n")?;
        assert_eq!(1, parsed.number_edges());
        assert_eq!(Some(1), parsed.weight_of(1, 0));

        let conflicting = parse_str("p edge undirected 3 3 0\ne 0 1 4\ne 1 2 1\ne 1 0 2\n")?;
        assert_eq!(2, conflicting.number_edges());
        assert_eq!(Some(4), conflicting.weight_of(0, 1));
        assert_eq!(Some(4), conflicting.weight_of(1, 0));

        let repeated_arc = parse_str("p edge directed 2 3 1\ne 0 1 3\ne 1 0 5\ne 0 1 7\n")?;
        assert_eq!(2, repeated_arc.number_edges());
        assert_eq!(Some(3), repeated_arc.weight_of(0, 1));
        assert_eq!(Some(5), repeated_arc.weight_of(1, 0));
        Ok(())
    }

    #[test]
    fn test_rejected_edges() {
        let out_of_range = parse_str("p edge directed 3 1 1\ne 0 3 1\n");
        assert!(matches!(
            out_of_range,
            Err(Error::EdgeRejected {
                line: 2,
                source: GraphError::InvalidVertex(3)
            })
        ));

        let self_loop = parse_str("p edge undirected 3 2 0\ne 0 1 1\ne 2 2 1\n");
        assert!(matches!(
            self_loop,
            Err(Error::EdgeRejected {
                line: 3,
                source: GraphError::SelfLoop(2)
            })
        ));
    }
}
