// ── Scratchpad content helpers ────────────────────────────────────────────────
//
// Everything derived from the text of the scratchpad that is not statistics:
// the window title, the file name suggested by Save, the path fix-up for long
// paths, and the UTF-8 file write itself.  No Win32 calls.

use std::{
    ffi::OsString,
    fs::OpenOptions,
    io::{self, Write},
    path::{Path, PathBuf},
};

// ── Names ─────────────────────────────────────────────────────────────────────

pub(crate) const APP_NAME: &str = "Scratchpad4k";

/// Title shown while the scratchpad is empty.
pub(crate) const EMPTY_TITLE: &str = "Scratchpad4k (empty)";

/// Suggested file name when the content offers nothing usable.
pub(crate) const EMPTY_FILE_NAME: &str = "(empty)";

/// At most this many characters of content feed the suggested file name.
const SUGGESTED_NAME_MAX_CHARS: usize = 100;

/// Characters Windows forbids in file names; each becomes `!`.
const INVALID_FILE_NAME_CHARS: [char; 9] = ['/', '\\', '<', '>', ':', '"', '|', '?', '*'];

// ── Paths ─────────────────────────────────────────────────────────────────────

/// `MAX_PATH`, in UTF-16 units.
const MAX_PATH: usize = 260;

/// Prefix that lifts the `MAX_PATH` limit for Win32 file APIs.
const VERBATIM_PREFIX: &str = r"\\?\";

/// Same, for `\\server\share` paths.
const VERBATIM_UNC_PREFIX: &str = r"\\?\UNC\";

// ── Title ─────────────────────────────────────────────────────────────────────

/// The text up to (not including) the first `\r` or `\n`.
pub(crate) fn first_line(text: &str) -> &str {
    match text.find(['\r', '\n']) {
        Some(end) => &text[..end],
        None => text,
    }
}

/// Length of `text` as the edit control counts it: UTF-16 code units.
pub(crate) fn wchar_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Main window title for the given content.
///
/// | Content | Title |
/// |---|---|
/// | empty | `"Scratchpad4k (empty)"` |
/// | `"hello\nworld"` | `"hello -- Scratchpad4k (11 wchars)"` |
pub(crate) fn window_title(text: &str) -> String {
    if text.is_empty() {
        return EMPTY_TITLE.to_owned();
    }
    format!(
        "{} -- {APP_NAME} ({} wchars)",
        first_line(text),
        wchar_len(text)
    )
}

// ── Save ──────────────────────────────────────────────────────────────────────

/// File name offered by the Save dialog: the start of the first line, with
/// characters that are illegal in file names replaced by `!`.
pub(crate) fn suggest_file_name(text: &str) -> String {
    let name: String = text
        .chars()
        .take(SUGGESTED_NAME_MAX_CHARS)
        .take_while(|&c| c != '\r' && c != '\n')
        .map(|c| if INVALID_FILE_NAME_CHARS.contains(&c) { '!' } else { c })
        .collect();

    if name.is_empty() {
        EMPTY_FILE_NAME.to_owned()
    } else {
        name
    }
}

/// Prefix `path` with `\\?\` (`\\?\UNC\` for network shares) when it is
/// too long for the classic Win32 APIs.
pub(crate) fn to_long_path(path: PathBuf) -> PathBuf {
    let lossy = path.to_string_lossy();
    if lossy.encode_utf16().count() < MAX_PATH || lossy.starts_with(VERBATIM_PREFIX) {
        return path;
    }
    // `\\server\share\…` becomes `\\?\UNC\server\share\…`.
    if let Some(share) = lossy.strip_prefix(r"\\") {
        return PathBuf::from(format!(r"{VERBATIM_UNC_PREFIX}{share}"));
    }
    let mut long = OsString::from(VERBATIM_PREFIX);
    long.push(path.as_os_str());
    PathBuf::from(long)
}

/// Create or truncate `path` and write `text` to it as UTF-8.
///
/// No BOM and no line-ending conversion.  Other processes may read the file
/// while it is open but not write to it.  The handle is closed before this
/// returns, whether or not the write succeeded.
pub(crate) fn write_utf8(path: &Path, text: &str) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(windows)]
    {
        use std::os::windows::fs::OpenOptionsExt;
        use windows::Win32::Storage::FileSystem::FILE_SHARE_READ;
        options.share_mode(FILE_SHARE_READ.0);
    }

    let mut file = options.open(path)?;
    file.write_all(text.as_bytes())?;
    file.flush()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_for_empty_content() {
        assert_eq!(window_title(""), "Scratchpad4k (empty)");
    }

    #[test]
    fn title_uses_first_line_and_full_length() {
        assert_eq!(
            window_title("hello\nworld"),
            "hello -- Scratchpad4k (11 wchars)"
        );
        assert_eq!(
            window_title("shopping\r\n3 eggs\r\n"),
            "shopping -- Scratchpad4k (18 wchars)"
        );
    }

    #[test]
    fn title_counts_utf16_units() {
        // U+1F600 is a surrogate pair in UTF-16.
        assert_eq!(
            window_title("\u{1F600}x"),
            "\u{1F600}x -- Scratchpad4k (3 wchars)"
        );
    }

    #[test]
    fn title_when_content_starts_with_line_break() {
        assert_eq!(window_title("\nbody"), " -- Scratchpad4k (5 wchars)");
    }

    #[test]
    fn first_line_stops_at_either_break() {
        assert_eq!(first_line("a\rb"), "a");
        assert_eq!(first_line("a\nb"), "a");
        assert_eq!(first_line("abc"), "abc");
    }

    #[test]
    fn suggestion_replaces_illegal_chars_and_stops_at_break() {
        assert_eq!(suggest_file_name("a/b:c*d\n rest"), "a!b!c!d");
        assert_eq!(suggest_file_name(r#"<x>|"y"?\z"#), "!x!!!y!!!z");
    }

    #[test]
    fn suggestion_for_empty_content() {
        assert_eq!(suggest_file_name(""), "(empty)");
        assert_eq!(suggest_file_name("\r\nsecond line"), "(empty)");
    }

    #[test]
    fn suggestion_is_capped_at_100_chars() {
        let long = "n".repeat(250);
        assert_eq!(suggest_file_name(&long).chars().count(), 100);
    }

    #[test]
    fn short_paths_are_left_alone() {
        let p = PathBuf::from(r"C:\notes\todo.txt");
        assert_eq!(to_long_path(p.clone()), p);
    }

    #[test]
    fn long_paths_get_verbatim_prefix_once() {
        let long = format!(r"C:\{}\file.txt", "d".repeat(300));
        let fixed = to_long_path(PathBuf::from(&long));
        assert_eq!(fixed, PathBuf::from(format!(r"\\?\{long}")));
        assert_eq!(to_long_path(fixed.clone()), fixed);
    }

    #[test]
    fn long_unc_paths_use_unc_form() {
        let share = format!(r"server\share\{}\file.txt", "d".repeat(300));
        let fixed = to_long_path(PathBuf::from(format!(r"\\{share}")));
        assert_eq!(fixed, PathBuf::from(format!(r"\\?\UNC\{share}")));
        assert_eq!(to_long_path(fixed.clone()), fixed);
    }

    #[test]
    fn short_unc_paths_are_left_alone() {
        let p = PathBuf::from(r"\\server\share\todo.txt");
        assert_eq!(to_long_path(p.clone()), p);
    }

    #[test]
    fn write_utf8_writes_exact_bytes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.txt");
        let text = "1 2 3\r\nnaïve ✓\n";

        write_utf8(&path, text).expect("write");
        assert_eq!(std::fs::read(&path).expect("read"), text.as_bytes());
    }

    #[test]
    fn write_utf8_truncates_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "a much longer previous content").expect("seed");

        write_utf8(&path, "short").expect("write");
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "short");
    }

    #[test]
    fn write_utf8_reports_missing_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing").join("out.txt");
        assert!(write_utf8(&path, "x").is_err());
    }
}
