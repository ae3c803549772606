use regex::Regex;
use std::sync::LazyLock;

// Leading "<digits>/" plus any whitespace after it
static ORDINAL_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+/\s*").expect("ordinal marker pattern is valid"));

/// Split numbered thread text into post bodies.
///
/// Blank lines are dropped, each remaining line is trimmed and loses one
/// leading ordinal marker such as `1/` or `12/`. Lines without a marker pass
/// through unchanged.
///
/// # Example
/// ```
/// use xthread_lib::parse_thread_input;
/// let posts = parse_thread_input("1/ Hello\n2/ World");
/// assert_eq!(posts, vec!["Hello", "World"]);
/// ```
pub fn parse_thread_input(thread_text: &str) -> Vec<String> {
    thread_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| ORDINAL_MARKER.replace(line, "").into_owned())
        .collect()
}
