//! Recovering a command line from the top of a process image.
//!
//! `exec` leaves `argc`, the argv pointers and a `-1` word directly below the argument strings,
//! so the strings start right after the last `-1` word in the page.

/// Non-printable bytes tolerated before the scan gives up on the rest of the page.
const MAX_BAD: usize = 5;

/// Recover the command line from a word-aligned image page.
///
/// NUL separators become spaces, non-printable bytes become `?`, and an environment entry
/// (the first word containing `=`) ends the command. Returns `None` when no `-1` word is found
/// or nothing printable remains.
pub fn recover_command(page: &[u8]) -> Option<String> {
    let marker = page
        .chunks_exact(2)
        .rposition(|w| w == [0xFF, 0xFF])?;
    let strings = &page[2 * marker + 2..];

    let mut out = String::with_capacity(strings.len());
    let mut bad = 0;
    for &b in strings {
        match b & 0o177 {
            0 => out.push(' '),
            b'=' => {
                // Drop the partial `NAME` as well.
                let keep = out.rfind(' ').unwrap_or(0);
                out.truncate(keep);
                break;
            }
            c @ b' '..=0o176 => out.push(char::from(c)),
            _ => {
                bad += 1;
                if bad > MAX_BAD {
                    break;
                }
                out.push('?');
            }
        }
    }

    let cmd = out.trim();
    (!cmd.is_empty()).then(|| cmd.to_owned())
}
