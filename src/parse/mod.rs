//! Structured extraction from free-text model output.
//!
//! The model's output is untyped text; this module is the defensive
//! boundary that converts it into program data. Query-list extraction
//! tries three strategies in strict order and takes the first that
//! yields anything; decision extraction reads a leading digit and fails
//! safe toward "complete" so an unparsable response can never loop the
//! orchestrator forever.

/// Narration phrases that mark a line as preamble, not a query.
const PREAMBLE_PHRASES: [&str; 6] = [
    "here are",
    "based on",
    "suggested",
    "search queries",
    "to gather",
    "follow these",
];

/// Which extraction strategy produced a query list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// The whole response parsed as a JSON array of strings.
    StrictJson(Vec<String>),
    /// A `[...]` block inside the text parsed as JSON.
    FencedBlock(Vec<String>),
    /// Line-by-line heuristic salvage.
    Heuristic(Vec<String>),
    /// Every strategy came up empty.
    Empty,
}

impl ParseOutcome {
    /// The extracted queries, consuming the outcome.
    pub fn into_queries(self) -> Vec<String> {
        match self {
            Self::StrictJson(q) | Self::FencedBlock(q) | Self::Heuristic(q) => q,
            Self::Empty => Vec::new(),
        }
    }

    /// Strategy label for logging.
    pub fn strategy(&self) -> &'static str {
        match self {
            Self::StrictJson(_) => "strict_json",
            Self::FencedBlock(_) => "fenced_block",
            Self::Heuristic(_) => "heuristic",
            Self::Empty => "empty",
        }
    }
}

/// Continue-or-stop decision extracted from a completion-check response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// More research rounds are warranted.
    Continue,
    /// Enough information has been gathered.
    Complete,
}

/// Extract a list of search queries from a model response.
///
/// Strategies are tried strictly in order — strict JSON, fenced `[...]`
/// block, line heuristic — and the first that yields at least one
/// accepted candidate wins. The result is truncated to `cap`. An
/// all-empty outcome is [`ParseOutcome::Empty`], not an error.
pub fn parse_query_list(text: &str, cap: usize) -> ParseOutcome {
    let text = text.trim();

    if let Some(queries) = strict_json(text) {
        let queries = accept(queries, cap);
        if !queries.is_empty() {
            return ParseOutcome::StrictJson(queries);
        }
    }

    if let Some(queries) = fenced_block(text) {
        let queries = accept(queries, cap);
        if !queries.is_empty() {
            return ParseOutcome::FencedBlock(queries);
        }
    }

    let queries = accept(line_heuristic(text), cap);
    if !queries.is_empty() {
        return ParseOutcome::Heuristic(queries);
    }

    ParseOutcome::Empty
}

/// Extract a continue/complete decision from the leading digit of a
/// response: `1` continues, `2` completes.
///
/// Returns `None` when no usable digit leads the response; the caller
/// applies the fail-safe `Complete` default and must log that fallback
/// distinctly from a genuine model-asserted completion.
pub fn parse_decision(text: &str) -> Option<Decision> {
    match text.trim().chars().next() {
        Some('1') => Some(Decision::Continue),
        Some('2') => Some(Decision::Complete),
        _ => None,
    }
}

/// Extract a single free-text query embedded in quotes, falling back to
/// the raw trimmed text when no quoted substring is present.
pub fn parse_quoted_query(text: &str) -> String {
    let trimmed = text.trim();
    if let Some(open) = trimmed.find('"') {
        if let Some(len) = trimmed[open + 1..].find('"') {
            let inner = &trimmed[open + 1..open + 1 + len];
            if !inner.is_empty() {
                return inner.to_string();
            }
        }
    }
    trimmed.to_string()
}

fn strict_json(text: &str) -> Option<Vec<String>> {
    serde_json::from_str::<Vec<String>>(text).ok()
}

fn fenced_block(text: &str) -> Option<Vec<String>> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end <= start {
        return None;
    }
    let block = &text[start..=end];

    if let Ok(queries) = serde_json::from_str::<Vec<String>>(block) {
        return Some(queries);
    }

    // Not valid JSON: split the inner block on lines and commas and strip
    // quote/comma punctuation from each element.
    let inner = &block[1..block.len() - 1];
    let elements: Vec<String> = inner
        .split(['\n', ','])
        .map(strip_punctuation)
        .filter(|s| !s.is_empty())
        .collect();
    if elements.is_empty() {
        None
    } else {
        Some(elements)
    }
}

fn line_heuristic(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| {
            let lower = line.to_lowercase();
            !PREAMBLE_PHRASES.iter().any(|p| lower.contains(p))
        })
        .filter(|line| !line.starts_with("```"))
        .filter(|line| !matches!(*line, "[" | "]" | "[]"))
        .map(|line| {
            // Remove list numbering and bullets before punctuation strip.
            line.trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == ')')
                .trim_start_matches(['-', '*'])
                .trim()
        })
        .map(strip_punctuation)
        .collect()
}

fn strip_punctuation(s: &str) -> String {
    s.trim()
        .trim_matches(['"', '\'', ',', '`'])
        .trim()
        .to_string()
}

/// Apply candidate rejection rules and the batch cap.
fn accept(candidates: Vec<String>, cap: usize) -> Vec<String> {
    candidates
        .into_iter()
        .map(|c| strip_punctuation(&c))
        .filter(|c| !c.is_empty())
        .filter(|c| c != "\\")
        .filter(|c| !c.starts_with("site:"))
        .take(cap)
        .collect()
}
