//! Random file and line selection.

use std::collections::HashMap;

use rand::Rng;

use super::schema::{LineRecord, StoredFile};
use crate::error::{FilelinesError, Result};

/// Pick one stored file uniformly at random.
pub fn pick_random_file<'a, R: Rng + ?Sized>(
    files: &'a [StoredFile],
    rng: &mut R,
) -> Result<&'a StoredFile> {
    if files.is_empty() {
        return Err(FilelinesError::NotFound("no files have been uploaded".into()));
    }
    Ok(&files[rng.gen_range(0..files.len())])
}

/// Pick one line of `file` uniformly at random.
pub fn pick_random_line<R: Rng + ?Sized>(
    file: &StoredFile,
    lines: &[String],
    rng: &mut R,
) -> Result<LineRecord> {
    if lines.is_empty() {
        return Err(FilelinesError::EmptyFile(file.filename.clone()));
    }
    let idx = rng.gen_range(0..lines.len());
    let text = lines[idx].clone();
    Ok(LineRecord {
        line_number: idx + 1,
        most_common_letter: most_common_char(&text),
        file_name: file.filename.clone(),
        text,
    })
}

/// Most frequent character once spaces are removed. Ties go to the
/// character seen first.
pub fn most_common_char(line: &str) -> Option<char> {
    // char -> (count, first position)
    let mut counts: HashMap<char, (usize, usize)> = HashMap::new();
    for (pos, c) in line.chars().filter(|&c| c != ' ').enumerate() {
        counts.entry(c).or_insert((0, pos)).0 += 1;
    }
    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(c, _)| c)
}
