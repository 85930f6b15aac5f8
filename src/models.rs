use std::collections::BTreeMap;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{PredictionError, RecordError};

macro_rules! labelled {
    ($name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Level {
    Low,
    Medium,
    High,
}

labelled!(Level { Low => "Low", Medium => "Medium", High => "High" });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum YesNo {
    Yes,
    No,
}

labelled!(YesNo { Yes => "Yes", No => "No" });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum SchoolType {
    Public,
    Private,
}

labelled!(SchoolType { Public => "Public", Private => "Private" });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum EducationLevel {
    #[serde(rename = "High School")]
    HighSchool,
    Bachelor,
    Master,
    #[serde(rename = "PhD")]
    Phd,
}

labelled!(EducationLevel {
    HighSchool => "High School",
    Bachelor => "Bachelor",
    Master => "Master",
    Phd => "PhD",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Distance {
    Near,
    Moderate,
    Far,
}

labelled!(Distance { Near => "Near", Moderate => "Moderate", Far => "Far" });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Gender {
    Male,
    Female,
}

labelled!(Gender { Male => "Male", Female => "Female" });

// Inclusive upper bounds; every lower bound is zero.
pub const NUMERIC_BOUNDS: [(&str, u8); 6] = [
    ("Hours_Studied", 15),
    ("Attendance", 100),
    ("Sleep_Hours", 12),
    ("Previous_Scores", 100),
    ("Tutoring_Sessions", 10),
    ("Physical_Activity", 20),
];

pub const FIELD_NAMES: [&str; 19] = [
    "Hours_Studied",
    "Attendance",
    "Parental_Involvement",
    "Access_to_Resources",
    "Extracurricular_Activities",
    "Sleep_Hours",
    "Previous_Scores",
    "Motivation_Level",
    "Internet_Access",
    "Tutoring_Sessions",
    "Family_Income",
    "Teacher_Quality",
    "School_Type",
    "Peer_Influence",
    "Physical_Activity",
    "Learning_Disabilities",
    "Parental_Education_Level",
    "Distance_from_Home",
    "Gender",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudentRecord {
    #[serde(rename = "Hours_Studied")]
    pub hours_studied: u8,
    #[serde(rename = "Attendance")]
    pub attendance: u8,
    #[serde(rename = "Parental_Involvement")]
    pub parental_involvement: Level,
    #[serde(rename = "Access_to_Resources")]
    pub access_to_resources: Level,
    #[serde(rename = "Extracurricular_Activities")]
    pub extracurricular_activities: YesNo,
    #[serde(rename = "Sleep_Hours")]
    pub sleep_hours: u8,
    #[serde(rename = "Previous_Scores")]
    pub previous_scores: u8,
    #[serde(rename = "Motivation_Level")]
    pub motivation_level: Level,
    #[serde(rename = "Internet_Access")]
    pub internet_access: YesNo,
    #[serde(rename = "Tutoring_Sessions")]
    pub tutoring_sessions: u8,
    #[serde(rename = "Family_Income")]
    pub family_income: Level,
    #[serde(rename = "Teacher_Quality")]
    pub teacher_quality: Level,
    #[serde(rename = "School_Type")]
    pub school_type: SchoolType,
    #[serde(rename = "Peer_Influence")]
    pub peer_influence: Level,
    #[serde(rename = "Physical_Activity")]
    pub physical_activity: u8,
    #[serde(rename = "Learning_Disabilities")]
    pub learning_disabilities: YesNo,
    #[serde(rename = "Parental_Education_Level")]
    pub parental_education_level: EducationLevel,
    #[serde(rename = "Distance_from_Home")]
    pub distance_from_home: Distance,
    #[serde(rename = "Gender")]
    pub gender: Gender,
}

impl StudentRecord {
    fn numeric_values(&self) -> [u8; 6] {
        [
            self.hours_studied,
            self.attendance,
            self.sleep_hours,
            self.previous_scores,
            self.tutoring_sessions,
            self.physical_activity,
        ]
    }

    pub fn validate(self) -> Result<Self, RecordError> {
        for ((field, max), value) in NUMERIC_BOUNDS.iter().zip(self.numeric_values()) {
            if value > *max {
                return Err(RecordError::OutOfRange {
                    field: *field,
                    value,
                    max: *max,
                });
            }
        }
        Ok(self)
    }

    pub fn to_feature_row(&self) -> FeatureRow {
        let mut row = FeatureRow::new();
        for ((field, _), value) in NUMERIC_BOUNDS.iter().zip(self.numeric_values()) {
            row.insert((*field).to_string(), FeatureValue::Numeric(value as f64));
        }

        let categories = [
            ("Parental_Involvement", self.parental_involvement.as_str()),
            ("Access_to_Resources", self.access_to_resources.as_str()),
            (
                "Extracurricular_Activities",
                self.extracurricular_activities.as_str(),
            ),
            ("Motivation_Level", self.motivation_level.as_str()),
            ("Internet_Access", self.internet_access.as_str()),
            ("Family_Income", self.family_income.as_str()),
            ("Teacher_Quality", self.teacher_quality.as_str()),
            ("School_Type", self.school_type.as_str()),
            ("Peer_Influence", self.peer_influence.as_str()),
            ("Learning_Disabilities", self.learning_disabilities.as_str()),
            (
                "Parental_Education_Level",
                self.parental_education_level.as_str(),
            ),
            ("Distance_from_Home", self.distance_from_home.as_str()),
            ("Gender", self.gender.as_str()),
        ];
        for (field, level) in categories {
            row.insert(field.to_string(), FeatureValue::Category(level.to_string()));
        }

        row
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Numeric(f64),
    Category(String),
}

pub type FeatureRow = BTreeMap<String, FeatureValue>;

pub type PredictionResult = Result<f64, PredictionError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestions {
    OnTrack,
    Advice(Vec<&'static str>),
}

#[derive(Debug, Clone)]
pub struct CategorySummary {
    pub category: String,
    pub count: usize,
    pub avg_score: f64,
}

#[derive(Debug, Clone)]
pub struct CohortContext {
    pub percentile: f64,
    pub by_motivation: Vec<CategorySummary>,
}

#[cfg(test)]
pub(crate) fn sample_record() -> StudentRecord {
    StudentRecord {
        hours_studied: 5,
        attendance: 90,
        parental_involvement: Level::Medium,
        access_to_resources: Level::High,
        extracurricular_activities: YesNo::Yes,
        sleep_hours: 7,
        previous_scores: 72,
        motivation_level: Level::High,
        internet_access: YesNo::Yes,
        tutoring_sessions: 3,
        family_income: Level::Medium,
        teacher_quality: Level::High,
        school_type: SchoolType::Public,
        peer_influence: Level::Medium,
        physical_activity: 4,
        learning_disabilities: YesNo::No,
        parental_education_level: EducationLevel::Bachelor,
        distance_from_home: Distance::Near,
        gender: Gender::Female,
    }
}
