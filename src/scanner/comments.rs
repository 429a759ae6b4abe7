/// Remove `//` and `/* */` comments, keeping line structure and string literals.
///
/// A block comment that never closes swallows the rest of the file.
pub fn strip_comments(text: &str) -> String {
    #[derive(Clone, Copy, PartialEq)]
    enum Mode { Code, Line, Block, Str }

    let mut out = String::with_capacity(text.len());
    let mut mode = Mode::Code;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match mode {
            Mode::Code => match (c, chars.peek()) {
                ('/', Some('/')) => { chars.next(); mode = Mode::Line; }
                ('/', Some('*')) => { chars.next(); mode = Mode::Block; out.push(' '); }
                ('"', _) => { out.push(c); mode = Mode::Str; }
                _ => out.push(c),
            },
            Mode::Line => {
                if c == '\n' {
                    out.push('\n');
                    mode = Mode::Code;
                }
            }
            Mode::Block => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    mode = Mode::Code;
                } else if c == '\n' {
                    out.push('\n');
                }
            }
            Mode::Str => {
                out.push(c);
                if c == '\\' {
                    if let Some(escaped) = chars.next() { out.push(escaped); }
                } else if c == '"' || c == '\n' {
                    mode = Mode::Code;
                }
            }
        }
    }

    if mode == Mode::Block {
        tracing::debug!("unterminated block comment, rest of file dropped");
        // drop the newlines kept while inside the unterminated comment
        let keep = out.trim_end_matches(['\n', ' ']).len();
        out.truncate(keep);
    }
    out
}
