#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadingLength {
    #[default]
    All,
    Quick,
    Medium,
    Long,
}

impl ReadingLength {
    pub const ALL: [ReadingLength; 4] = [
        ReadingLength::All,
        ReadingLength::Quick,
        ReadingLength::Medium,
        ReadingLength::Long,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ReadingLength::All => "All Lengths",
            ReadingLength::Quick => "Quick Read",
            ReadingLength::Medium => "Medium Read",
            ReadingLength::Long => "In-Depth Read",
        }
    }

    pub fn duration(self) -> &'static str {
        match self {
            ReadingLength::All => "Any duration",
            ReadingLength::Quick => "< 3 min",
            ReadingLength::Medium => "3-7 min",
            ReadingLength::Long => "> 7 min",
        }
    }

    pub fn word_count(self) -> &'static str {
        match self {
            ReadingLength::All => "All articles",
            ReadingLength::Quick => "< 500 words",
            ReadingLength::Medium => "500-1500 words",
            ReadingLength::Long => "> 1500 words",
        }
    }
}
