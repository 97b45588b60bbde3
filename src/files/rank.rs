use std::cmp::Reverse;

use super::lines::read_lines;
use super::schema::StoredFile;
use super::storage::FileStorage;
use crate::error::Result;

/// How many lines `/longest-100` returns across every stored file.
pub const LONGEST_ALL: usize = 100;

/// How many lines `/longest-20/{id}` returns for a single file.
pub const LONGEST_PER_FILE: usize = 20;

/// The `n` longest lines, trimmed, longest first. Lines of equal length keep
/// the order in which they were scanned.
pub fn top_longest<I, S>(lines: I, n: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut trimmed: Vec<String> = lines
        .into_iter()
        .map(|line| line.as_ref().trim().to_string())
        .collect();
    // sort_by_cached_key is stable
    trimmed.sort_by_cached_key(|line| Reverse(line.chars().count()));
    trimmed.truncate(n);
    trimmed
}

/// Read every file in order and rank their lines together.
pub async fn longest_lines(
    storage: &FileStorage,
    files: &[StoredFile],
    n: usize,
) -> Result<Vec<String>> {
    let mut all_lines = Vec::new();
    for file in files {
        all_lines.extend(read_lines(storage, file).await?);
    }
    Ok(top_longest(all_lines, n))
}
