/// Timed messages shown in the centre of the screen.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum MessageKind {
    /// Shown once when the session starts.
    Initial,
    /// Fires at exactly five attempts.
    RentAnotherFourYears,
    /// Fires at every tenth attempt.
    UnaffordableListings,
}

/// Re-entrancy group. Two messages of the same class never overlap.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GuardClass {
    Initial,
    Humorous,
}

impl MessageKind {
    pub fn text(self) -> &'static str {
        match self {
            MessageKind::Initial => {
                "The game is simple, get on the property ladder and get the keys to your first home!"
            }
            MessageKind::RentAnotherFourYears => {
                "Maybe you should consider renting for another 4 years."
            }
            MessageKind::UnaffordableListings => {
                "Maybe you should just look at properties on KnokKnok that you can't afford."
            }
        }
    }

    pub fn guard_class(self) -> GuardClass {
        match self {
            MessageKind::Initial => GuardClass::Initial,
            MessageKind::RentAnotherFourYears | MessageKind::UnaffordableListings => {
                GuardClass::Humorous
            }
        }
    }
}

/// Greedy word wrap to at most `width` columns per line.
/// Words longer than `width` are split hard.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let mut word: &str = word;
        loop {
            let line_len = line.chars().count();
            let word_len = word.chars().count();
            let needed = if line.is_empty() { word_len } else { line_len + 1 + word_len };
            if needed <= width {
                if !line.is_empty() { line.push(' '); }
                line.push_str(word);
                break;
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                continue;
            }
            // Word alone exceeds the width
            let split = word.char_indices().nth(width).map(|(i, _)| i).unwrap_or(word.len());
            lines.push(word[..split].to_string());
            word = &word[split..];
            if word.is_empty() { break; }
        }
    }
    if !line.is_empty() { lines.push(line); }
    lines
}
