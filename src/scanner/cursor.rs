use regex::Regex;

/// A cursor over an input buffer. Patterns are attempted against the
/// unconsumed remainder and only count when they match at the cursor.
#[derive(Debug, Clone, Default)]
pub struct StrScanner {
    string: String,
    pos: usize,
}

impl StrScanner {
    pub fn new(input: &str) -> StrScanner {
        StrScanner {
            string: input.to_string(),
            pos: 0,
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn string(&self) -> &str {
        &self.string
    }

    /// The unconsumed remainder of the input.
    pub fn rest(&self) -> &str {
        &self.string[self.pos..]
    }

    pub fn eos(&self) -> bool {
        self.pos >= self.string.len()
    }

    /// Non-consuming prefix test.
    pub fn check(&self, pattern: &Regex) -> bool {
        matches!(pattern.find(self.rest()), Some(m) if m.start() == 0)
    }

    /// Consuming match: advances the cursor and yields the matched text.
    pub fn scan(&mut self, pattern: &Regex) -> Option<String> {
        let m = pattern.find(self.rest())?;
        if m.start() != 0 {
            return None;
        }
        let text = m.as_str().to_string();
        self.pos += m.end();
        Some(text)
    }

    /// Consuming match: advances the cursor and yields the matched length,
    /// without allocating the text.
    pub fn skip(&mut self, pattern: &Regex) -> Option<usize> {
        let m = pattern.find(self.rest())?;
        if m.start() != 0 {
            return None;
        }
        let end = m.end();
        self.pos += end;
        Some(end)
    }
}
