//! Hand-written lexer/evaluator for a single dotenv file's text.
//!
//! The grammar has two states — expecting a name, expecting a value — and
//! value segments dispatch purely on their leading byte (`'`, `"`, or bare).
//! That shape is a state machine, not a regex chain: backslash-escape
//! counting and `${...}` nesting both need a cursor that can look ahead and
//! commit byte-by-byte, which a single scanning pass over `char_indices`
//! gives us without backtracking.

use std::collections::HashSet;

use indexmap::IndexMap;

use super::error::Error;

/// Parses the text of one dotenv file into its name/value mapping.
///
/// This entry point has no notion of a "loaded-by-us" set (interpolation
/// falls back straight to process env); [`DotenvLexer::parse_with_loaded`]
/// is used internally by the cascade, which does track one.
pub struct DotenvLexer;

impl DotenvLexer {
    /// Parses `text`, attributing diagnostics to `path`.
    pub fn parse(text: &str, path: &str) -> Result<IndexMap<String, String>, Error> {
        Self::parse_with_loaded(text, path, &HashSet::new())
    }

    /// Parses `text` using `loaded_by_us` for the interpolation lookup:
    /// names in this set prefer the current parse's own value over process
    /// env.
    pub(crate) fn parse_with_loaded(
        text: &str,
        path: &str,
        loaded_by_us: &HashSet<String>,
    ) -> Result<IndexMap<String, String>, Error> {
        if text.starts_with('\u{feff}') {
            return Err(Error::format_at(path, text, 0, "leading UTF-8 BOM is not permitted"));
        }

        let normalized = normalize_line_endings(text);
        let mut scanner = Scanner::new(&normalized, path, loaded_by_us);
        scanner.run()?;
        Ok(scanner.values)
    }
}

/// Replaces `\r\n` with `\n`. Lone `\r` bytes are left untouched and treated
/// as ordinary segment content.
fn normalize_line_endings(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' && chars.peek() == Some(&'\n') {
            continue;
        }
        out.push(c);
    }
    out
}

const DIRECTIVE_COMMENT: &str = "# @dotenv-expand-commands";

#[cfg(unix)]
const HAS_POSIX_SHELL: bool = true;
#[cfg(not(unix))]
const HAS_POSIX_SHELL: bool = false;

struct Scanner<'a> {
    path: &'a str,
    text: &'a str,
    chars: Vec<char>,
    byte_offsets: Vec<usize>,
    pos: usize,
    loaded_by_us: &'a HashSet<String>,
    commands_enabled: bool,
    values: IndexMap<String, String>,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str, path: &'a str, loaded_by_us: &'a HashSet<String>) -> Self {
        let mut chars = Vec::new();
        let mut byte_offsets = Vec::new();
        for (offset, ch) in text.char_indices() {
            byte_offsets.push(offset);
            chars.push(ch);
        }
        byte_offsets.push(text.len());

        Scanner {
            path,
            text,
            chars,
            byte_offsets,
            pos: 0,
            loaded_by_us,
            commands_enabled: false,
            values: IndexMap::new(),
        }
    }

    fn len(&self) -> usize {
        self.chars.len()
    }

    fn offset(&self) -> usize {
        self.byte_offsets[self.pos]
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, delta: usize) -> Option<char> {
        self.chars.get(self.pos + delta).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> Error {
        Error::format_at(self.path, self.text, offset, message)
    }

    fn run(&mut self) -> Result<(), Error> {
        loop {
            self.skip_trivia();
            if self.pos >= self.len() {
                break;
            }
            self.parse_assignment()?;
        }
        Ok(())
    }

    /// Skips blank lines and comment-only lines. Outside of a value, this is
    /// the only place a `#` is ever examined for the expansion directive.
    fn skip_trivia(&mut self) {
        loop {
            while matches!(self.peek(), Some(' ') | Some('\t')) {
                self.advance();
            }
            match self.peek() {
                Some('\n') => {
                    self.advance();
                }
                Some('#') => {
                    let start = self.pos;
                    while !matches!(self.peek(), None | Some('\n')) {
                        self.advance();
                    }
                    let line: String = self.chars[start..self.pos].iter().collect();
                    if line.trim() == DIRECTIVE_COMMENT {
                        self.commands_enabled = true;
                    }
                    if self.peek() == Some('\n') {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn parse_assignment(&mut self) -> Result<(), Error> {
        self.consume_export_prefix();

        let name_start = self.pos;
        let name = self.consume_name()?;
        if name.is_empty() {
            return Err(self.error(self.offset(), "expected a variable name"));
        }

        match self.peek() {
            Some('=') => {
                self.advance();
            }
            _ => {
                return Err(self.error(
                    self.byte_offsets[name_start],
                    "expected '=' after variable name",
                ));
            }
        }

        if matches!(self.peek(), Some(' ') | Some('\t')) {
            return Err(self.error(self.offset(), "value must not be preceded by whitespace"));
        }

        let value = self.parse_value()?;

        if self.peek() == Some('\n') {
            self.advance();
        }

        self.values.insert(name, value);
        Ok(())
    }

    fn consume_export_prefix(&mut self) {
        const KEYWORD: &str = "export";
        let kw: Vec<char> = KEYWORD.chars().collect();
        if self.chars[self.pos..].starts_with(&kw[..]) {
            let after = self.pos + kw.len();
            if matches!(self.chars.get(after), Some(' ') | Some('\t')) {
                self.pos = after;
                while matches!(self.peek(), Some(' ') | Some('\t')) {
                    self.advance();
                }
            }
        }
    }

    fn consume_name(&mut self) -> Result<String, Error> {
        let start = self.pos;
        if self.peek() == Some('_') {
            self.advance();
        }
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() => {
                self.advance();
            }
            _ => {
                return Err(self.error(self.byte_offsets[start], "invalid variable name"));
            }
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.advance();
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    /// Parses the concatenation of segments making up one assignment's
    /// value, stopping at LF or EOF.
    fn parse_value(&mut self) -> Result<String, Error> {
        let mut out = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => break,
                Some('\'') => out.push_str(&self.single_quoted_segment()?),
                Some('"') => out.push_str(&self.double_quoted_segment()?),
                _ => out.push_str(&self.bare_segment()?),
            }
        }
        Ok(out)
    }

    fn single_quoted_segment(&mut self) -> Result<String, Error> {
        let quote_offset = self.offset();
        self.advance(); // opening '
        let start = self.pos;
        loop {
            match self.peek() {
                Some('\'') => {
                    let content: String = self.chars[start..self.pos].iter().collect();
                    self.advance();
                    return Ok(content);
                }
                None | Some('\n') => {
                    return Err(self.error(quote_offset, "unterminated single-quoted value"));
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn double_quoted_segment(&mut self) -> Result<String, Error> {
        let quote_offset = self.offset();
        self.advance(); // opening "
        let mut raw = String::new();
        let mut offsets: Vec<usize> = Vec::new();
        loop {
            match self.peek() {
                Some('"') => {
                    self.advance();
                    return self.interpolate(&raw, &offsets);
                }
                None | Some('\n') => {
                    return Err(self.error(quote_offset, "unterminated double-quoted value"));
                }
                Some('\\') => {
                    // A run of backslashes immediately followed by '$' is
                    // left untouched, backslash count and all, so the
                    // odd/even accounting in interpolate() sees the real
                    // source run length rather than one already thinned by
                    // an eager "\\" -> "\" collapse here.
                    let run_start = self.pos;
                    let mut look = self.pos;
                    while self.chars.get(look).copied() == Some('\\') {
                        look += 1;
                    }
                    if self.chars.get(look).copied() == Some('$') {
                        for p in run_start..look {
                            raw.push('\\');
                            offsets.push(self.byte_offsets[p]);
                        }
                        self.pos = look;
                        continue;
                    }

                    let escape_offset = self.offset();
                    self.advance();
                    match self.peek() {
                        Some('"') => {
                            raw.push('"');
                            offsets.push(escape_offset);
                            self.advance();
                        }
                        Some('\\') => {
                            raw.push('\\');
                            offsets.push(escape_offset);
                            self.advance();
                        }
                        Some('r') => {
                            raw.push('\r');
                            offsets.push(escape_offset);
                            self.advance();
                        }
                        Some('n') => {
                            raw.push('\n');
                            offsets.push(escape_offset);
                            self.advance();
                        }
                        None => {
                            return Err(
                                self.error(escape_offset, "dangling '\\' at end of double-quoted value")
                            );
                        }
                        Some(other) => {
                            raw.push('\\');
                            offsets.push(escape_offset);
                            raw.push(other);
                            offsets.push(self.offset());
                            self.advance();
                        }
                    }
                }
                Some(c) => {
                    offsets.push(self.offset());
                    raw.push(c);
                    self.advance();
                }
            }
        }
    }

    fn bare_segment(&mut self) -> Result<String, Error> {
        let mut raw = String::new();
        let mut offsets: Vec<usize> = Vec::new();
        let mut trim_trailing = false;
        loop {
            match self.peek() {
                None | Some('\n') => {
                    trim_trailing = true;
                    break;
                }
                Some(q @ ('\'' | '"')) => {
                    if ends_with_odd_backslashes(&raw) {
                        raw.pop();
                        offsets.pop();
                        offsets.push(self.offset());
                        raw.push(q);
                        self.advance();
                    } else {
                        break;
                    }
                }
                Some('#') => {
                    let preceded_by_ws = raw.chars().last().is_some_and(|c| c == ' ' || c == '\t');
                    if preceded_by_ws {
                        trim_trailing = true;
                        break;
                    }
                    offsets.push(self.offset());
                    raw.push('#');
                    self.advance();
                }
                Some(c) => {
                    offsets.push(self.offset());
                    raw.push(c);
                    self.advance();
                }
            }
        }

        let trimmed_count = if trim_trailing {
            raw.chars().count() - raw.trim_end().chars().count()
        } else {
            0
        };
        let trimmed: &str = if trim_trailing { raw.trim_end() } else { &raw };
        let trimmed_offsets = &offsets[..offsets.len() - trimmed_count];
        validate_bare_whitespace(trimmed, self.path, self.text, self.offset())?;
        self.interpolate(trimmed, trimmed_offsets)
    }

    /// Resolves `$NAME` / `${NAME}` / `${NAME:-DEFAULT}` / `${NAME:=DEFAULT}`
    /// and `$(...)` command substitution, and un-escapes any `\$` left by
    /// [`Self::double_quoted_segment`].
    ///
    /// `offsets[i]` is the original source byte offset of `segment`'s `i`th
    /// char, so interpolation errors can point at the real offending token
    /// even though `segment` was already built (and the scanner's own
    /// cursor has moved past it) by the time this runs.
    fn interpolate(&mut self, segment: &str, offsets: &[usize]) -> Result<String, Error> {
        let chars: Vec<char> = segment.chars().collect();
        let mut out = String::new();
        let mut i = 0;
        while i < chars.len() {
            if chars[i] == '\\' {
                let start = i;
                while i < chars.len() && chars[i] == '\\' {
                    i += 1;
                }
                let run = i - start;
                let escapes_dollar = run % 2 == 1 && i < chars.len() && chars[i] == '$';
                out.push_str(&"\\".repeat(run / 2));
                if escapes_dollar {
                    out.push('$');
                    i += 1;
                } else if run % 2 == 1 {
                    out.push('\\');
                }
                continue;
            }

            if chars[i] == '$' {
                let (expanded, consumed) = self.expand_dollar(&chars[i..], offsets[i])?;
                out.push_str(&expanded);
                i += consumed;
                continue;
            }

            out.push(chars[i]);
            i += 1;
        }
        Ok(out)
    }

    fn expand_dollar(&mut self, rest: &[char], dollar_offset: usize) -> Result<(String, usize), Error> {
        debug_assert_eq!(rest[0], '$');

        match rest.get(1) {
            Some('(') if self.commands_enabled => self.expand_command_substitution(rest, dollar_offset),
            Some('{') => self.expand_braced(rest, dollar_offset),
            Some(c) if *c == '_' || c.is_ascii_alphabetic() => self.expand_bare_name(rest),
            _ => Ok(("$".to_string(), 1)),
        }
    }

    fn expand_bare_name(&self, rest: &[char]) -> Result<(String, usize), Error> {
        let mut i = 1;
        while i < rest.len() && (rest[i].is_ascii_alphanumeric() || rest[i] == '_') {
            i += 1;
        }
        let name: String = rest[1..i].iter().collect();
        Ok((self.lookup(&name), i))
    }

    fn expand_braced(&mut self, rest: &[char], open_offset: usize) -> Result<(String, usize), Error> {
        let mut i = 2; // past "${"
        let name_start = i;
        if !matches!(rest.get(i), Some(c) if *c == '_' || c.is_ascii_alphabetic()) {
            return Err(self.error(open_offset, "expected a variable name after '${'"));
        }
        i += 1;
        while i < rest.len() && (rest[i].is_ascii_alphanumeric() || rest[i] == '_') {
            i += 1;
        }
        let name: String = rest[name_start..i].iter().collect();

        match rest.get(i) {
            Some('}') => Ok((self.lookup(&name), i + 1)),
            Some(':') => {
                let op = rest.get(i + 1);
                let is_default_assign = op == Some(&'=');
                let is_default = op == Some(&'-');
                if !is_default && !is_default_assign {
                    return Err(self.error(open_offset, "expected ':-' or ':=' after variable name"));
                }
                let default_start = i + 2;
                let mut j = default_start;
                loop {
                    match rest.get(j) {
                        Some('}') => break,
                        Some(c @ ('\'' | '"' | '{' | '$')) => {
                            return Err(self.error(
                                open_offset,
                                format!("default value may not contain '{c}' unescaped"),
                            ));
                        }
                        Some('\\') if rest.get(j + 1) == Some(&'$') => {
                            return Err(self.error(
                                open_offset,
                                "default value may not contain an escaped '$'",
                            ));
                        }
                        Some(_) => j += 1,
                        None => return Err(self.error(open_offset, "unclosed '${'")),
                    }
                }
                let default: String = rest[default_start..j].iter().collect();
                let looked_up = self.lookup(&name);

                let value = if looked_up.is_empty() {
                    if is_default_assign {
                        self.values.insert(name, default.clone());
                    }
                    default
                } else {
                    looked_up
                };
                Ok((value, j + 1))
            }
            _ => Err(self.error(open_offset, "unclosed '${'")),
        }
    }

    fn expand_command_substitution(&mut self, rest: &[char], open_offset: usize) -> Result<(String, usize), Error> {
        let mut depth = 0usize;
        let mut i = 1; // at '('
        let body_start = i + 1;
        loop {
            match rest.get(i) {
                Some('(') => {
                    depth += 1;
                    i += 1;
                }
                Some(')') => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    i += 1;
                }
                Some(_) => i += 1,
                None => return Err(self.error(open_offset, "unclosed '$('")),
            }
        }
        let command: String = rest[body_start..i].iter().collect();
        let consumed = i + 1;

        if !HAS_POSIX_SHELL {
            return Err(self.error(open_offset, "command substitution requires a POSIX shell"));
        }

        Ok((self.run_command(&command).unwrap_or_else(|| format!("$({command})")), consumed))
    }

    #[cfg(unix)]
    fn run_command(&self, command: &str) -> Option<String> {
        let mut cmd = std::process::Command::new("sh");
        cmd.arg("-c").arg(command);
        for (key, value) in &self.values {
            if self.loaded_by_us.contains(key) || std::env::var(key).is_err() {
                cmd.env(key, value);
            }
        }
        let output = cmd.output().ok()?;
        if !output.status.success() {
            return None;
        }
        let text = String::from_utf8_lossy(&output.stdout);
        Some(text.trim_end_matches('\n').to_string())
    }

    #[cfg(not(unix))]
    fn run_command(&self, _command: &str) -> Option<String> {
        None
    }

    fn lookup(&self, name: &str) -> String {
        if self.loaded_by_us.contains(name) {
            if let Some(value) = self.values.get(name) {
                return value.clone();
            }
        }
        if let Ok(value) = std::env::var(name) {
            return value;
        }
        if let Some(value) = self.values.get(name) {
            return value.clone();
        }
        String::new()
    }
}

fn ends_with_odd_backslashes(s: &str) -> bool {
    s.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

/// Walks `segment` looking for a literal whitespace byte outside any
/// `$NAME` / `${...}` token span. Those tokens may legitimately expand to
/// whitespace-bearing values; the bare-segment rule only forbids whitespace
/// that's already present in the source text.
fn validate_bare_whitespace(segment: &str, path: &str, full_text: &str, base_offset: usize) -> Result<(), Error> {
    let chars: Vec<char> = segment.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            ' ' | '\t' => {
                return Err(Error::format_at(
                    path,
                    full_text,
                    base_offset,
                    "value containing spaces must be surrounded by quotes",
                ));
            }
            '$' => {
                i += 1;
                if chars.get(i) == Some(&'{') {
                    i += 1;
                    while i < chars.len() && chars[i] != '}' {
                        i += 1;
                    }
                    if i < chars.len() {
                        i += 1;
                    }
                } else {
                    while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                        i += 1;
                    }
                }
            }
            _ => i += 1,
        }
    }
    Ok(())
}
