use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;

use crate::models::{
    Distance, EducationLevel, Gender, Level, SchoolType, StudentRecord, YesNo,
};

/// The form: one flag per field, defaulting to the form's initial values.
#[derive(Args, Debug, Clone)]
pub struct RecordArgs {
    /// Read the whole record from a JSON file keyed by dataset column names
    #[arg(long, conflicts_with_all = FIELD_FLAGS)]
    pub record: Option<PathBuf>,

    /// Hours studied per day (0-15)
    #[arg(long, default_value_t = 5)]
    pub hours_studied: u8,
    /// Attendance percentage (0-100)
    #[arg(long, default_value_t = 75)]
    pub attendance: u8,
    #[arg(long, value_enum, default_value_t = Level::Low)]
    pub parental_involvement: Level,
    #[arg(long, value_enum, default_value_t = Level::Low)]
    pub access_to_resources: Level,
    #[arg(long, value_enum, default_value_t = YesNo::Yes)]
    pub extracurricular_activities: YesNo,
    /// Sleep hours per night (0-12)
    #[arg(long, default_value_t = 7)]
    pub sleep_hours: u8,
    /// Previous exam score (0-100)
    #[arg(long, default_value_t = 60)]
    pub previous_scores: u8,
    #[arg(long, value_enum, default_value_t = Level::Low)]
    pub motivation_level: Level,
    #[arg(long, value_enum, default_value_t = YesNo::Yes)]
    pub internet_access: YesNo,
    /// Tutoring sessions per week (0-10)
    #[arg(long, default_value_t = 2)]
    pub tutoring_sessions: u8,
    #[arg(long, value_enum, default_value_t = Level::Low)]
    pub family_income: Level,
    #[arg(long, value_enum, default_value_t = Level::Low)]
    pub teacher_quality: Level,
    #[arg(long, value_enum, default_value_t = SchoolType::Public)]
    pub school_type: SchoolType,
    #[arg(long, value_enum, default_value_t = Level::Low)]
    pub peer_influence: Level,
    /// Physical activity in hours per week (0-20)
    #[arg(long, default_value_t = 5)]
    pub physical_activity: u8,
    #[arg(long, value_enum, default_value_t = YesNo::Yes)]
    pub learning_disabilities: YesNo,
    #[arg(long, value_enum, default_value_t = EducationLevel::HighSchool)]
    pub parental_education_level: EducationLevel,
    #[arg(long, value_enum, default_value_t = Distance::Near)]
    pub distance_from_home: Distance,
    #[arg(long, value_enum, default_value_t = Gender::Male)]
    pub gender: Gender,
}

const FIELD_FLAGS: [&str; 19] = [
    "hours_studied",
    "attendance",
    "parental_involvement",
    "access_to_resources",
    "extracurricular_activities",
    "sleep_hours",
    "previous_scores",
    "motivation_level",
    "internet_access",
    "tutoring_sessions",
    "family_income",
    "teacher_quality",
    "school_type",
    "peer_influence",
    "physical_activity",
    "learning_disabilities",
    "parental_education_level",
    "distance_from_home",
    "gender",
];

impl RecordArgs {
    /// Builds the validated record for this submission.
    pub fn collect(self) -> anyhow::Result<StudentRecord> {
        if let Some(path) = &self.record {
            return load_record(path);
        }

        let record = StudentRecord {
            hours_studied: self.hours_studied,
            attendance: self.attendance,
            parental_involvement: self.parental_involvement,
            access_to_resources: self.access_to_resources,
            extracurricular_activities: self.extracurricular_activities,
            sleep_hours: self.sleep_hours,
            previous_scores: self.previous_scores,
            motivation_level: self.motivation_level,
            internet_access: self.internet_access,
            tutoring_sessions: self.tutoring_sessions,
            family_income: self.family_income,
            teacher_quality: self.teacher_quality,
            school_type: self.school_type,
            peer_influence: self.peer_influence,
            physical_activity: self.physical_activity,
            learning_disabilities: self.learning_disabilities,
            parental_education_level: self.parental_education_level,
            distance_from_home: self.distance_from_home,
            gender: self.gender,
        };
        Ok(record.validate()?)
    }
}

pub fn load_record(path: &Path) -> anyhow::Result<StudentRecord> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read record {}", path.display()))?;
    let record: StudentRecord = serde_json::from_str(&raw)
        .with_context(|| format!("invalid record {}", path.display()))?;
    Ok(record.validate()?)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct Form {
        #[command(flatten)]
        record: RecordArgs,
    }

    fn parse(args: &[&str]) -> Result<RecordArgs, clap::Error> {
        Form::try_parse_from(std::iter::once("form").chain(args.iter().copied()))
            .map(|form| form.record)
    }

    #[test]
    fn defaults_match_the_form() {
        let record = parse(&[]).unwrap().collect().unwrap();
        assert_eq!(record.hours_studied, 5);
        assert_eq!(record.attendance, 75);
        assert_eq!(record.sleep_hours, 7);
        assert_eq!(record.previous_scores, 60);
        assert_eq!(record.tutoring_sessions, 2);
        assert_eq!(record.physical_activity, 5);
        assert_eq!(record.parental_involvement, Level::Low);
        assert_eq!(record.parental_education_level, EducationLevel::HighSchool);
        assert_eq!(record.gender, Gender::Male);
    }

    #[test]
    fn flags_override_defaults() {
        let args = parse(&[
            "--hours-studied",
            "12",
            "--motivation-level",
            "high",
            "--parental-education-level",
            "phd",
            "--internet-access",
            "no",
        ])
        .unwrap();
        let record = args.collect().unwrap();
        assert_eq!(record.hours_studied, 12);
        assert_eq!(record.motivation_level, Level::High);
        assert_eq!(record.parental_education_level, EducationLevel::Phd);
        assert_eq!(record.internet_access, YesNo::No);
    }

    #[test]
    fn out_of_range_flag_is_rejected() {
        let err = parse(&["--attendance", "120"]).unwrap().collect().unwrap_err();
        assert_eq!(err.to_string(), "Attendance must be between 0 and 100, got 120");
    }

    #[test]
    fn record_file_conflicts_with_field_flags() {
        assert!(parse(&["--record", "r.json", "--gender", "female"]).is_err());
    }

    #[test]
    fn record_file_is_loaded_and_validated() {
        let record = crate::models::sample_record();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        serde_json::to_writer(&mut file, &record).unwrap();
        file.flush().unwrap();

        let path = file.path().to_str().unwrap();
        let loaded = parse(&["--record", path]).unwrap().collect().unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn record_file_missing_a_field_is_rejected() {
        let mut json = serde_json::to_value(crate::models::sample_record()).unwrap();
        json.as_object_mut().unwrap().remove("Gender");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        serde_json::to_writer(&mut file, &json).unwrap();
        file.flush().unwrap();

        let err = load_record(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("missing field `Gender`"));
    }

    #[test]
    fn record_file_with_unknown_level_is_rejected() {
        let mut json = serde_json::to_value(crate::models::sample_record()).unwrap();
        json["Motivation_Level"] = serde_json::Value::from("Extreme");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        serde_json::to_writer(&mut file, &json).unwrap();
        file.flush().unwrap();

        assert!(load_record(file.path()).is_err());
    }
}
