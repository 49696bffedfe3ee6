//! Percentage to letter-grade mapping

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LetterGrade {
    APlus,
    A,
    AMinus,
    BPlus,
    B,
    BMinus,
    CPlus,
    C,
    CMinus,
    D,
    F,
}

/// Lower bound (inclusive) of each bucket, highest first
const GRADE_TABLE: &[(f64, LetterGrade)] = &[
    (97.0, LetterGrade::APlus),
    (93.0, LetterGrade::A),
    (90.0, LetterGrade::AMinus),
    (87.0, LetterGrade::BPlus),
    (83.0, LetterGrade::B),
    (80.0, LetterGrade::BMinus),
    (77.0, LetterGrade::CPlus),
    (73.0, LetterGrade::C),
    (70.0, LetterGrade::CMinus),
    (60.0, LetterGrade::D),
];

impl LetterGrade {
    pub fn from_percentage(percentage: f64) -> Self {
        GRADE_TABLE
            .iter()
            .find(|(lower, _)| percentage >= *lower)
            .map(|(_, grade)| *grade)
            .unwrap_or(LetterGrade::F)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LetterGrade::APlus => "A+",
            LetterGrade::A => "A",
            LetterGrade::AMinus => "A-",
            LetterGrade::BPlus => "B+",
            LetterGrade::B => "B",
            LetterGrade::BMinus => "B-",
            LetterGrade::CPlus => "C+",
            LetterGrade::C => "C",
            LetterGrade::CMinus => "C-",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        }
    }

    /// Parses a grade token as a judgment might write it ("a-", " B+ ").
    pub fn parse(token: &str) -> Option<Self> {
        let normalized = token.trim().to_uppercase();
        [
            LetterGrade::APlus,
            LetterGrade::A,
            LetterGrade::AMinus,
            LetterGrade::BPlus,
            LetterGrade::B,
            LetterGrade::BMinus,
            LetterGrade::CPlus,
            LetterGrade::C,
            LetterGrade::CMinus,
            LetterGrade::D,
            LetterGrade::F,
        ]
        .into_iter()
        .find(|g| g.as_str() == normalized)
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
