//! Adds the `(cherry picked from commit ...)` trailer to `git format-patch`
//! output, the way `git interpret-trailers` would.
use regex::Regex;

use crate::Result;

const CHERRY_PICK_PREFIX: &str = "(cherry picked from commit ";
const DIFF_SEPARATOR: &str = "---";

/// Trailer prefixes git writes itself.
const GIT_GENERATED_PREFIXES: [&str; 2] =
    ["Signed-off-by: ", CHERRY_PICK_PREFIX];

pub fn cherry_pick_trailer(sha: &str) -> String {
    format!("{CHERRY_PICK_PREFIX}{sha})")
}

/// Whether the last paragraph of a commit message is a trailer block.
///
/// Either every line is a trailer, or a quarter of them are and one was
/// written by git. Indented lines continue the trailer above them.
fn is_trailer_block(paragraph: &[&str], token: &Regex) -> bool {
    let mut trailer_lines = 0;
    let mut non_trailer_lines = 0;
    let mut continuation_lines = 0;
    let mut recognized_prefix = false;

    for line in paragraph.iter().rev() {
        if GIT_GENERATED_PREFIXES.iter().any(|p| line.starts_with(p)) {
            trailer_lines += 1;
            continuation_lines = 0;
            recognized_prefix = true;
        } else if line.starts_with([' ', '\t']) {
            continuation_lines += 1;
        } else if token.is_match(line) {
            trailer_lines += 1;
            continuation_lines = 0;
        } else {
            non_trailer_lines += continuation_lines + 1;
            continuation_lines = 0;
        }
    }
    non_trailer_lines += continuation_lines;

    (recognized_prefix && trailer_lines * 3 >= non_trailer_lines)
        || (trailer_lines > 0 && non_trailer_lines == 0)
}

/// Insert the cherry-pick trailer into the commit message of `patch`.
///
/// The message lies between the blank line that ends the mail headers and the
/// `---` line that starts the diffstat. If its last paragraph is already a
/// trailer block the line joins it, otherwise it becomes a new paragraph.
pub fn append_cherry_pick_trailer(patch: &str, sha: &str) -> Result<String> {
    let token = Regex::new(r"^[A-Za-z0-9-]+[ \t]*:")?;
    let trailer = cherry_pick_trailer(sha);

    let mut lines = patch.lines().collect::<Vec<&str>>();

    let body_start = lines
        .iter()
        .position(|l| l.is_empty())
        .map(|i| i + 1)
        .unwrap_or(lines.len());

    let separator = lines[body_start..]
        .iter()
        .position(|l| *l == DIFF_SEPARATOR)
        .map(|i| body_start + i)
        .unwrap_or(lines.len());

    let last = lines[body_start..separator]
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .map(|i| body_start + i);

    match last {
        None => lines.insert(body_start.min(separator), &trailer),
        Some(last) => {
            let paragraph_start = lines[body_start..=last]
                .iter()
                .rposition(|l| l.trim().is_empty())
                .map(|i| body_start + i + 1)
                .unwrap_or(body_start);

            if is_trailer_block(&lines[paragraph_start..=last], &token) {
                lines.insert(last + 1, &trailer);
            } else {
                lines.splice(last + 1..last + 1, ["", trailer.as_str()]);
            }
        }
    }

    let mut out = lines.join("\n");
    if patch.ends_with('\n') {
        out.push('\n');
    }

    Ok(out)
}
