use std::collections::HashMap;

use bevy::prelude::Resource;
use rand::prelude::*;
use thiserror::Error;
use tracing::warn;

/// Answer structure of a question. True/false questions carry no option
/// list; their two answers are implicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionBody {
    MultipleChoice {
        options: &'static [&'static str],
        correct: usize,
    },
    TrueFalse {
        answer: bool,
    },
}

/// Immutable trivia question reference data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizQuestion {
    pub id: &'static str,
    pub prompt: &'static str,
    pub body: QuestionBody,
    pub explanation: &'static str,
    pub category: &'static str,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum QuestionError {
    #[error("question `{0}` has fewer than two options")]
    TooFewOptions(&'static str),

    #[error("question `{0}` marks a correct option that does not exist")]
    CorrectOutOfRange(&'static str),
}

impl QuizQuestion {
    pub fn validate(&self) -> Result<(), QuestionError> {
        match self.body {
            QuestionBody::MultipleChoice { options, correct } => {
                if options.len() < 2 {
                    return Err(QuestionError::TooFewOptions(self.id));
                }
                if correct >= options.len() {
                    return Err(QuestionError::CorrectOutOfRange(self.id));
                }
                Ok(())
            }
            QuestionBody::TrueFalse { .. } => Ok(()),
        }
    }

    pub const fn option_count(&self) -> usize {
        match self.body {
            QuestionBody::MultipleChoice { options, .. } => options.len(),
            QuestionBody::TrueFalse { .. } => 2,
        }
    }

    /// Display label of option `index`. For true/false questions index 0 is
    /// "True" and index 1 is "False".
    pub fn option_label(&self, index: usize) -> &'static str {
        match self.body {
            QuestionBody::MultipleChoice { options, .. } => options.get(index).copied().unwrap_or(""),
            QuestionBody::TrueFalse { .. } => {
                if index == 0 { "True" } else { "False" }
            }
        }
    }

    pub const fn is_correct(&self, index: usize) -> bool {
        match self.body {
            QuestionBody::MultipleChoice { correct, .. } => index == correct,
            QuestionBody::TrueFalse { answer } => (index == 0) == answer,
        }
    }
}

pub static QUESTIONS: &[QuizQuestion] = &[
    QuizQuestion {
        id: "bee-dance",
        prompt: "How do honeybees tell hive mates\nwhere flowers are?",
        body: QuestionBody::MultipleChoice {
            options: &["A waggle dance", "Loud buzzing", "Scent trails on the ground"],
            correct: 0,
        },
        explanation: "The waggle dance encodes both the direction\nand the distance of a food source.",
        category: "bees",
    },
    QuizQuestion {
        id: "pollen-purpose",
        prompt: "What does pollen carry?",
        body: QuestionBody::MultipleChoice {
            options: &["Plant sugars", "Male plant cells", "Flower perfume"],
            correct: 1,
        },
        explanation: "Pollen grains hold the male cells a flower\nneeds to make seeds.",
        category: "plants",
    },
    QuizQuestion {
        id: "one-third-food",
        prompt: "About one in three bites of food\ndepends on pollinators.",
        body: QuestionBody::TrueFalse { answer: true },
        explanation: "Roughly a third of the crops we eat need\nanimal pollinators to produce fruit.",
        category: "ecology",
    },
    QuizQuestion {
        id: "bee-sleep",
        prompt: "Bees never sleep.",
        body: QuestionBody::TrueFalse { answer: false },
        explanation: "Bees do sleep, five to eight hours a day,\nsome even holding each other's legs.",
        category: "bees",
    },
    QuizQuestion {
        id: "flower-color-uv",
        prompt: "Which 'color' can bees see\nthat humans cannot?",
        body: QuestionBody::MultipleChoice {
            options: &["Infrared", "Ultraviolet", "Plain red"],
            correct: 1,
        },
        explanation: "Many flowers paint ultraviolet landing\nguides that only pollinators can see.",
        category: "bees",
    },
    QuizQuestion {
        id: "honey-lifetime",
        prompt: "How much honey does one worker bee\nmake in her whole life?",
        body: QuestionBody::MultipleChoice {
            options: &["About a teaspoon", "About a jar", "About a 12th of a teaspoon"],
            correct: 2,
        },
        explanation: "A single worker produces only about one\ntwelfth of a teaspoon of honey.",
        category: "bees",
    },
    QuizQuestion {
        id: "moth-pollinators",
        prompt: "Moths pollinate flowers at night.",
        body: QuestionBody::TrueFalse { answer: true },
        explanation: "Night-blooming flowers rely on moths\nand bats while bees are asleep.",
        category: "ecology",
    },
    QuizQuestion {
        id: "buzz-pollination",
        prompt: "Which crop needs 'buzz pollination',\nwhere bees vibrate the flower?",
        body: QuestionBody::MultipleChoice {
            options: &["Tomatoes", "Wheat", "Apples"],
            correct: 0,
        },
        explanation: "Tomato flowers only release pollen when\nshaken at just the right frequency.",
        category: "plants",
    },
    QuizQuestion {
        id: "wind-pollination",
        prompt: "All flowering plants need insects\nto be pollinated.",
        body: QuestionBody::TrueFalse { answer: false },
        explanation: "Grasses and many trees let the wind\ncarry their pollen instead.",
        category: "plants",
    },
    QuizQuestion {
        id: "queen-eggs",
        prompt: "How many eggs can a queen bee\nlay in a single day?",
        body: QuestionBody::MultipleChoice {
            options: &["Around 20", "Around 200", "Around 2000"],
            correct: 2,
        },
        explanation: "In peak season a queen lays up to two\nthousand eggs every day.",
        category: "bees",
    },
    QuizQuestion {
        id: "nectar-vs-pollen",
        prompt: "Why do flowers offer nectar?",
        body: QuestionBody::MultipleChoice {
            options: &[
                "To feed their own roots",
                "To reward visiting pollinators",
                "To poison leaf-eating insects",
            ],
            correct: 1,
        },
        explanation: "Nectar is the sugary payment that keeps\npollinators coming back.",
        category: "plants",
    },
    QuizQuestion {
        id: "solitary-bees",
        prompt: "Most bee species live alone,\nnot in hives.",
        body: QuestionBody::TrueFalse { answer: true },
        explanation: "Of about 20,000 bee species, the vast\nmajority are solitary nesters.",
        category: "bees",
    },
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuestionStats {
    pub asked: u32,
    pub correct: u32,
}

/// The validated question pool plus per-question statistics for the running
/// process. Selection favors the least-asked questions and never repeats the
/// previous one back to back.
#[derive(Resource)]
pub struct QuizBank {
    questions: Vec<&'static QuizQuestion>,
    stats: HashMap<&'static str, QuestionStats>,
    last: Option<&'static str>,
}

impl Default for QuizBank {
    fn default() -> Self {
        Self::from_questions(QUESTIONS)
    }
}

impl QuizBank {
    /// Builds a bank from a static table, dropping entries that fail
    /// validation. A malformed question costs one log line, not a crash.
    pub fn from_questions(table: &'static [QuizQuestion]) -> Self {
        let mut questions = Vec::with_capacity(table.len());
        for question in table {
            match question.validate() {
                Ok(()) => questions.push(question),
                Err(err) => warn!("skipping quiz question: {err}"),
            }
        }
        Self {
            questions,
            stats: HashMap::new(),
            last: None,
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Draws the next question: uniformly among the least-asked candidates,
    /// excluding the immediately previous question when possible.
    pub fn draw<R: Rng>(&mut self, rng: &mut R) -> Option<&'static QuizQuestion> {
        let candidates: Vec<&'static QuizQuestion> = if self.questions.len() > 1 {
            self.questions
                .iter()
                .copied()
                .filter(|q| Some(q.id) != self.last)
                .collect()
        } else {
            self.questions.clone()
        };

        let least_asked = candidates
            .iter()
            .map(|q| self.asked_count(q.id))
            .min()?;
        let question = candidates
            .into_iter()
            .filter(|q| self.asked_count(q.id) == least_asked)
            .choose(rng)?;

        self.stats.entry(question.id).or_default().asked += 1;
        self.last = Some(question.id);
        Some(question)
    }

    pub fn record_result(&mut self, id: &'static str, correct: bool) {
        if correct {
            self.stats.entry(id).or_default().correct += 1;
        }
    }

    pub fn stats_for(&self, id: &str) -> QuestionStats {
        self.stats.get(id).copied().unwrap_or_default()
    }

    fn asked_count(&self, id: &str) -> u32 {
        self.stats.get(id).map_or(0, |s| s.asked)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    static BAD_TABLE: &[QuizQuestion] = &[
        QuizQuestion {
            id: "ok-tf",
            prompt: "Bees fly.",
            body: QuestionBody::TrueFalse { answer: true },
            explanation: "They do.",
            category: "test",
        },
        QuizQuestion {
            id: "no-options",
            prompt: "Broken entry",
            body: QuestionBody::MultipleChoice {
                options: &[],
                correct: 0,
            },
            explanation: "",
            category: "test",
        },
        QuizQuestion {
            id: "bad-correct",
            prompt: "Broken entry",
            body: QuestionBody::MultipleChoice {
                options: &["a", "b"],
                correct: 5,
            },
            explanation: "",
            category: "test",
        },
    ];

    #[test]
    fn test_shipped_questions_all_valid() {
        for question in QUESTIONS {
            assert!(
                question.validate().is_ok(),
                "invalid shipped question {}",
                question.id
            );
        }
    }

    #[test]
    fn test_malformed_questions_are_skipped() {
        let bank = QuizBank::from_questions(BAD_TABLE);
        assert_eq!(bank.len(), 1, "only the valid entry survives");
    }

    #[test]
    fn test_true_false_correctness_mapping() {
        let question = &BAD_TABLE[0];
        assert!(question.is_correct(0), "index 0 means True");
        assert!(!question.is_correct(1), "index 1 means False");
        assert_eq!(question.option_label(0), "True");
        assert_eq!(question.option_label(1), "False");
    }

    #[test]
    fn test_draw_never_repeats_immediately() {
        let mut bank = QuizBank::default();
        let mut rng = rand::thread_rng();
        let mut previous: Option<&str> = None;
        for _ in 0..50 {
            let question = bank.draw(&mut rng).expect("bank not empty");
            assert_ne!(previous, Some(question.id), "immediate repeat");
            previous = Some(question.id);
        }
    }

    #[test]
    fn test_draw_cycles_through_whole_pool() {
        let mut bank = QuizBank::default();
        let total = bank.len();
        let mut rng = rand::thread_rng();
        let mut seen = HashSet::new();
        // Least-asked bias means every question appears within two passes.
        for _ in 0..(total * 2) {
            if let Some(question) = bank.draw(&mut rng) {
                seen.insert(question.id);
            }
        }
        assert_eq!(seen.len(), total, "selection starves some questions");
    }

    #[test]
    fn test_statistics_track_asked_and_correct() {
        let mut bank = QuizBank::from_questions(BAD_TABLE);
        let mut rng = rand::thread_rng();
        let question = bank.draw(&mut rng).expect("bank not empty");
        bank.record_result(question.id, true);
        let stats = bank.stats_for(question.id);
        assert_eq!(stats.asked, 1);
        assert_eq!(stats.correct, 1);

        let question = bank.draw(&mut rng).expect("bank not empty");
        bank.record_result(question.id, false);
        let stats = bank.stats_for(question.id);
        assert_eq!(stats.asked, 2);
        assert_eq!(stats.correct, 1);
    }
}
