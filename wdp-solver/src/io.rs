//! The bid file lists one XOR bid per line after a declared count:
//!
//! ```text
//! 2
//! [1, 2] 10 XOR [3] 4
//! [2, 3] 5
//! ```
//!
//! The fairness file gives the horizon `T`, then one group of
//! `bid_id request_id` pairs per line:
//!
//! ```text
//! 12
//! 0 0,1 0
//! 0 1
//! ```

use crate::{Bid, Fairness, FairnessGroup, Instance, InstanceError, Item, Request, RequestError};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};
use tracing::{Level, event};

/// What was wrong with a line
#[derive(Debug, thiserror::Error)]
pub enum ParseErrorKind {
    /// The underlying reader failed
    #[error("unable to read input: {0}")]
    Read(#[source] std::io::Error),

    /// The file is empty
    #[error("missing bid count")]
    MissingCount,

    /// The first line is not a count
    #[error("invalid bid count {0:?}")]
    InvalidCount(String),

    /// The declared count disagrees with the number of bid lines
    #[error("declared {declared} bids but found {actual}")]
    CountMismatch {
        /// The count on the first line
        declared: usize,
        /// The number of bid lines that followed
        actual: usize,
    },

    /// A blank line where a bid or group was expected
    #[error("unexpected empty line")]
    EmptyLine,

    /// A request is not of the form `[items] utility`
    #[error("unbalanced brackets in request {0:?}")]
    UnbalancedBrackets(String),

    /// An item is not an integer
    #[error("invalid item {0:?}")]
    InvalidItem(String),

    /// A utility is not a non-negative integer
    #[error("invalid utility {0:?}")]
    InvalidUtility(String),

    /// A request lists an item twice
    #[error("item {0} appears more than once in the request")]
    DuplicateItem(Item),

    /// The fairness file is empty
    #[error("missing horizon")]
    MissingHorizon,

    /// The first line of the fairness file is not an integer
    #[error("invalid horizon {0:?}")]
    InvalidHorizon(String),

    /// A fairness pair is not of the form `bid_id request_id`
    #[error("malformed pair {0:?}")]
    MalformedPair(String),

    /// A bid or request id is not an integer
    #[error("invalid id {0:?}")]
    InvalidId(String),
}

/// A parse failure, tagged with its 1-based line number
#[derive(Debug, thiserror::Error)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    /// The 1-based line number
    pub line: usize,
    /// What went wrong
    pub kind: ParseErrorKind,
}

impl ParseError {
    fn new(line: usize, kind: ParseErrorKind) -> Self {
        Self { line, kind }
    }
}

/// A failure to turn files on disk into an [`Instance`]
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be opened
    #[error("unable to open {}: {source}", path.display())]
    Io {
        /// The file
        path: PathBuf,
        /// The cause
        source: std::io::Error,
    },

    /// The file could not be parsed
    #[error("{}: {source}", path.display())]
    Parse {
        /// The file
        path: PathBuf,
        /// The cause
        source: ParseError,
    },

    /// The files parsed, but do not describe a valid auction
    #[error(transparent)]
    Instance(#[from] InstanceError),
}

// Collect the lines, dropping trailing blank lines
fn read_lines(reader: impl BufRead) -> Result<Vec<String>, ParseError> {
    let mut lines = reader
        .lines()
        .enumerate()
        .map(|(i, line)| line.map_err(|e| ParseError::new(i + 1, ParseErrorKind::Read(e))))
        .collect::<Result<Vec<_>, _>>()?;
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    Ok(lines)
}

fn parse_request(token: &str) -> Result<Request, ParseErrorKind> {
    let token = token.trim();
    let unbalanced = || ParseErrorKind::UnbalancedBrackets(token.to_owned());

    let (items, utility) = token
        .strip_prefix('[')
        .and_then(|rest| rest.split_once(']'))
        .ok_or_else(unbalanced)?;
    if items.contains(['[', ']']) || utility.contains(['[', ']']) {
        return Err(unbalanced());
    }

    // Only a fully blank list is an empty request; `[1,]` or `[,]` are malformed
    let items = match items.trim() {
        "" => Vec::new(),
        items => items
            .split(',')
            .map(str::trim)
            .map(|item| {
                item.parse::<u64>()
                    .map(Item)
                    .map_err(|_| ParseErrorKind::InvalidItem(item.to_owned()))
            })
            .collect::<Result<Vec<_>, _>>()?,
    };

    let utility = utility.trim();
    let utility = utility
        .parse::<u64>()
        .map_err(|_| ParseErrorKind::InvalidUtility(utility.to_owned()))?;

    Request::new(items, utility).map_err(|error| match error {
        RequestError::DuplicateItem(item) => ParseErrorKind::DuplicateItem(item),
        RequestError::Utility(utility) => ParseErrorKind::InvalidUtility(utility.to_string()),
    })
}

fn parse_bid(line: &str) -> Result<Bid, ParseErrorKind> {
    if line.trim().is_empty() {
        return Err(ParseErrorKind::EmptyLine);
    }
    line.split("XOR").map(parse_request).collect()
}

/// Parse a bid file.
///
/// The first line declares the number of bids and must match the number of
/// bid lines that follow (trailing blank lines are ignored). Every alternative
/// carries its own utility.
pub fn parse_bids(reader: impl BufRead) -> Result<Vec<Bid>, ParseError> {
    let lines = read_lines(reader)?;
    let (first, rest) = lines
        .split_first()
        .ok_or(ParseError::new(1, ParseErrorKind::MissingCount))?;

    let declared = first
        .trim()
        .parse::<usize>()
        .map_err(|_| ParseError::new(1, ParseErrorKind::InvalidCount(first.trim().to_owned())))?;
    if declared != rest.len() {
        return Err(ParseError::new(
            1,
            ParseErrorKind::CountMismatch {
                declared,
                actual: rest.len(),
            },
        ));
    }

    rest.iter()
        .enumerate()
        .map(|(i, line)| parse_bid(line).map_err(|kind| ParseError::new(i + 2, kind)))
        .collect()
}

fn parse_group(line: &str) -> Result<FairnessGroup, ParseErrorKind> {
    if line.trim().is_empty() {
        return Err(ParseErrorKind::EmptyLine);
    }
    line.split(',')
        .map(|token| {
            let ids = token.split_whitespace().collect::<Vec<_>>();
            let [bid, request] = ids[..] else {
                return Err(ParseErrorKind::MalformedPair(token.trim().to_owned()));
            };
            let id = |s: &str| {
                s.parse::<usize>()
                    .map_err(|_| ParseErrorKind::InvalidId(s.to_owned()))
            };
            Ok((id(bid)?, id(request)?))
        })
        .collect()
}

/// Parse a fairness file: the horizon `T`, then one group per line.
pub fn parse_fairness(reader: impl BufRead) -> Result<Fairness, ParseError> {
    let lines = read_lines(reader)?;
    let (first, rest) = lines
        .split_first()
        .ok_or(ParseError::new(1, ParseErrorKind::MissingHorizon))?;

    let horizon = first
        .trim()
        .parse::<u32>()
        .map_err(|_| ParseError::new(1, ParseErrorKind::InvalidHorizon(first.trim().to_owned())))?;

    let groups = rest
        .iter()
        .enumerate()
        .map(|(i, line)| parse_group(line).map_err(|kind| ParseError::new(i + 2, kind)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Fairness { horizon, groups })
}

fn open(path: &Path) -> Result<BufReader<File>, LoadError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| LoadError::Io {
            path: path.to_owned(),
            source,
        })
}

/// Read and parse a bid file from disk
pub fn load_bids(path: &Path) -> Result<Vec<Bid>, LoadError> {
    parse_bids(open(path)?).map_err(|source| LoadError::Parse {
        path: path.to_owned(),
        source,
    })
}

/// Read and parse a fairness file from disk
pub fn load_fairness(path: &Path) -> Result<Fairness, LoadError> {
    parse_fairness(open(path)?).map_err(|source| LoadError::Parse {
        path: path.to_owned(),
        source,
    })
}

/// Load and validate an auction.
///
/// Without a fairness file the instance has no groups and a zero horizon.
pub fn load_instance(
    bids: &Path,
    fairness: Option<&Path>,
    fairness_const: f64,
) -> Result<Instance, LoadError> {
    let bids = load_bids(bids)?;
    let fairness = match fairness {
        Some(path) => load_fairness(path)?,
        None => Fairness::default(),
    };

    event!(
        Level::INFO,
        bids = bids.len(),
        requests = bids.iter().map(|bid| bid.requests().len()).sum::<usize>(),
        groups = fairness.groups.len(),
        horizon = fairness.horizon,
        "loaded auction"
    );

    Ok(Instance::new(bids, fairness, fairness_const)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bids(input: &str) -> Result<Vec<Bid>, ParseError> {
        parse_bids(input.as_bytes())
    }

    fn fairness(input: &str) -> Result<Fairness, ParseError> {
        parse_fairness(input.as_bytes())
    }

    #[test]
    fn test_parse_bids() {
        let parsed = bids("2\n[1, 2] 10 XOR [3] 4\n[2, 3] 5\n").unwrap();
        assert_eq!(parsed.len(), 2);

        let first = parsed[0].requests();
        assert_eq!(first.len(), 2);
        assert_eq!(
            first[0].items().iter().copied().collect::<Vec<_>>(),
            vec![Item(1), Item(2)]
        );
        assert_eq!(first[0].utility(), 10);
        assert_eq!(first[1].utility(), 4);

        assert_eq!(parsed[1].requests()[0].utility(), 5);
    }

    #[test]
    fn test_per_request_utility() {
        let parsed = bids("1\n[1] 7 XOR [2] 9 XOR [] 0\n").unwrap();
        let utilities = parsed[0]
            .requests()
            .iter()
            .map(Request::utility)
            .collect::<Vec<_>>();
        assert_eq!(utilities, vec![7, 9, 0]);
        assert!(parsed[0].requests()[2].items().is_empty());
    }

    #[test]
    fn test_trailing_blank_lines() {
        assert_eq!(bids("1\n[1] 1\n\n\n").unwrap().len(), 1);
        assert_eq!(bids("0\n").unwrap().len(), 0);
    }

    #[test]
    fn test_count_mismatch() {
        let error = bids("3\n[1, 2] 10\n[2, 3] 5\n").unwrap_err();
        assert_eq!(error.line, 1);
        assert!(matches!(
            error.kind,
            ParseErrorKind::CountMismatch {
                declared: 3,
                actual: 2
            }
        ));

        assert!(matches!(
            bids("1\n[1] 1\n[2] 2\n").unwrap_err().kind,
            ParseErrorKind::CountMismatch {
                declared: 1,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_missing_or_invalid_count() {
        assert!(matches!(
            bids("").unwrap_err().kind,
            ParseErrorKind::MissingCount
        ));
        assert!(matches!(
            bids("two\n[1] 1\n").unwrap_err().kind,
            ParseErrorKind::InvalidCount(_)
        ));
    }

    #[test]
    fn test_invalid_item() {
        let error = bids("2\n[1] 1\n[1, x] 3\n").unwrap_err();
        assert_eq!(error.line, 3);
        assert!(matches!(error.kind, ParseErrorKind::InvalidItem(ref s) if s == "x"));

        for input in ["1\n[1,,2] 5\n", "1\n[,] 3\n", "1\n[1,] 3\n", "1\n[ , 1] 3\n"] {
            let error = bids(input).unwrap_err();
            assert_eq!(error.line, 2, "{input:?}");
            assert!(
                matches!(error.kind, ParseErrorKind::InvalidItem(ref s) if s.is_empty()),
                "{input:?}"
            );
        }

        // a blank list is still an empty request
        assert!(bids("1\n[ ] 3\n").unwrap()[0].requests()[0].items().is_empty());
    }

    #[test]
    fn test_unbalanced_brackets() {
        for input in ["1\n[1, 2 10\n", "1\n1, 2] 10\n", "1\n[[1, 2] 10\n", "1\n[1] 2]\n"] {
            assert!(
                matches!(
                    bids(input).unwrap_err().kind,
                    ParseErrorKind::UnbalancedBrackets(_)
                ),
                "{input:?}"
            );
        }
    }

    #[test]
    fn test_invalid_utility() {
        assert!(matches!(
            bids("1\n[1] -4\n").unwrap_err().kind,
            ParseErrorKind::InvalidUtility(_)
        ));
        assert!(matches!(
            bids("1\n[1]\n").unwrap_err().kind,
            ParseErrorKind::InvalidUtility(_)
        ));

        // above 2^53 the objective can no longer tell utilities apart
        assert!(bids("1\n[1] 9007199254740992\n").is_ok());
        assert!(matches!(
            bids("1\n[1] 9007199254740993\n").unwrap_err().kind,
            ParseErrorKind::InvalidUtility(ref s) if s == "9007199254740993"
        ));
    }

    #[test]
    fn test_duplicate_item() {
        assert!(matches!(
            bids("1\n[4, 4] 1\n").unwrap_err().kind,
            ParseErrorKind::DuplicateItem(Item(4))
        ));
    }

    #[test]
    fn test_empty_bid_line() {
        let error = bids("3\n[1] 1\n\n[2] 2\n").unwrap_err();
        assert_eq!(error.line, 3);
        assert!(matches!(error.kind, ParseErrorKind::EmptyLine));
    }

    #[test]
    fn test_parse_fairness() {
        let parsed = fairness("12\n0 0,1 0\n0 1\n").unwrap();
        assert_eq!(parsed.horizon, 12);
        assert_eq!(parsed.groups.len(), 2);
        assert_eq!(parsed.groups[0].pairs(), &[(0, 0), (1, 0)]);
        assert_eq!(parsed.groups[1].pairs(), &[(0, 1)]);
    }

    #[test]
    fn test_fairness_errors() {
        assert!(matches!(
            fairness("").unwrap_err().kind,
            ParseErrorKind::MissingHorizon
        ));
        assert!(matches!(
            fairness("1.5\n").unwrap_err().kind,
            ParseErrorKind::InvalidHorizon(_)
        ));

        let error = fairness("4\n0 0\n0 1 2\n").unwrap_err();
        assert_eq!(error.line, 3);
        assert!(matches!(error.kind, ParseErrorKind::MalformedPair(_)));

        assert!(matches!(
            fairness("4\n0 a\n").unwrap_err().kind,
            ParseErrorKind::InvalidId(ref s) if s == "a"
        ));
    }
}
