use std::collections::HashMap;

/// Splits a line on runs of whitespace. Blank input yields no tokens.
pub fn tokenize(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

/// Splits a submitted line into its `;`-delimited sub-commands.
///
/// Segments are returned as-is; callers tokenize them and skip the empty ones.
pub fn split_commands(line: &str) -> impl Iterator<Item = &str> {
    line.split(';')
}

/// Replaces the first token with its alias, if it has one.
///
/// The replacement is not expanded again. When a substitution happens the
/// tokens are rejoined with single spaces; otherwise the line is returned untouched.
pub fn apply_aliases(line: &str, aliases: &HashMap<String, String>) -> String {
    let mut tokens = tokenize(line);
    let Some(first) = tokens.first_mut() else {
        return line.to_string();
    };

    match aliases.get(first.as_str()) {
        Some(replacement) => {
            *first = replacement.clone();
            tokens.join(" ")
        }
        None => line.to_string(),
    }
}
