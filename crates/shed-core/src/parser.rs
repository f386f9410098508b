//! Play recap parsing.
//!
//! Recap lines look like
//! `web1.example.com : ok=7 changed=0 unreachable=0 failed=0 skipped=1 rescued=0 ignored=0`
//! and become `host_web1.example.com_ok = 7`, ... Every other line is ignored.

use std::{collections::BTreeSet, fmt, sync::LazyLock};

use regex::Regex;
use shed_model::{LAST_RUN_RETURNCODE, MetricKey, Metrics, STATS_LAST_UPDATED};

use crate::unix_now;

static RECAP_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z0-9.]+)\s+:\s+(\S+=.*)$").expect("recap line pattern is valid")
});

/// A `key=value` token on a recap line that could not be used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseWarning {
    pub line: usize,
    pub hostname: String,
    pub token: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: skipped token `{}` for host {}",
            self.line, self.token, self.hostname
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedOutput {
    /// Per-host counters plus the return code and last-updated globals.
    pub metrics: Metrics,
    /// Tokens dropped from otherwise valid recap lines.
    pub warnings: Vec<ParseWarning>,
}

impl ParsedOutput {
    /// Number of distinct hosts with at least one counter.
    pub fn host_count(&self) -> usize {
        self.metrics
            .keys()
            .filter_map(|k| k.strip_prefix(shed_model::HOST_PREFIX))
            .filter_map(|rest| rest.split_once('_').map(|(h, _)| h))
            .collect::<BTreeSet<_>>()
            .len()
    }
}

/// Parse playbook output stamped with the current time.
pub fn parse_output(output: &str, returncode: i32) -> ParsedOutput {
    parse_output_at(output, returncode, unix_now())
}

/// Parse playbook output with an explicit `last_updated` timestamp.
///
/// Total: any input yields at least the return code and last-updated metrics.
/// A repeated host line overwrites the earlier one.
pub fn parse_output_at(output: &str, returncode: i32, now: i64) -> ParsedOutput {
    let mut parsed = ParsedOutput::default();

    for (idx, line) in output.lines().enumerate() {
        let Some(caps) = RECAP_LINE.captures(line.trim_end()) else {
            continue;
        };
        let hostname = &caps[1];

        for token in caps[2].split_whitespace() {
            match parse_token(token) {
                Some((stat, value)) => {
                    let key = MetricKey::host(hostname, stat);
                    parsed.metrics.insert(key.to_string(), value);
                }
                None => parsed.warnings.push(ParseWarning {
                    line: idx + 1,
                    hostname: hostname.to_string(),
                    token: token.to_string(),
                }),
            }
        }
    }

    parsed
        .metrics
        .insert(LAST_RUN_RETURNCODE.to_string(), i64::from(returncode));
    parsed.metrics.insert(STATS_LAST_UPDATED.to_string(), now);
    parsed
}

fn parse_token(token: &str) -> Option<(&str, i64)> {
    let (key, value) = token.split_once('=')?;
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_lowercase() || b == b'_') {
        return None;
    }
    let value = value.parse::<i64>().ok()?;
    Some((key, value))
}
