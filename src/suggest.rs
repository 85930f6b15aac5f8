use crate::models::{Level, StudentRecord, Suggestions, YesNo};

pub const ON_TRACK: &str = "You are on the right track! Keep maintaining your good habits.";

struct Rule {
    applies: fn(&StudentRecord) -> bool,
    advice: &'static str,
}

// Evaluation order is display order.
const RULES: [Rule; 8] = [
    Rule {
        applies: |r| r.hours_studied < 2,
        advice: "Increase your daily study hours to at least 3–4.",
    },
    Rule {
        applies: |r| r.attendance < 75,
        advice: "Improve class attendance for better continuity.",
    },
    Rule {
        applies: |r| r.parental_involvement == Level::Low,
        advice: "Encourage parental engagement.",
    },
    Rule {
        applies: |r| r.internet_access == YesNo::No,
        advice: "Ensure reliable internet access for e-learning.",
    },
    Rule {
        applies: |r| r.tutoring_sessions < 2,
        advice: "Consider regular tutoring sessions.",
    },
    Rule {
        applies: |r| r.sleep_hours < 6,
        advice: "Aim for 6–8 hours of sleep for better mental performance.",
    },
    Rule {
        applies: |r| r.motivation_level == Level::Low,
        advice: "Set small goals to stay motivated.",
    },
    Rule {
        applies: |r| r.physical_activity < 2,
        advice: "Include light physical activity weekly.",
    },
];

pub fn suggest(record: &StudentRecord) -> Suggestions {
    let advice: Vec<&'static str> = RULES
        .iter()
        .filter(|rule| (rule.applies)(record))
        .map(|rule| rule.advice)
        .collect();

    if advice.is_empty() {
        Suggestions::OnTrack
    } else {
        Suggestions::Advice(advice)
    }
}

impl Suggestions {
    pub fn lines(&self) -> Vec<&'static str> {
        match self {
            Suggestions::OnTrack => vec![ON_TRACK],
            Suggestions::Advice(advice) => advice.clone(),
        }
    }
}
