//! End-to-end README generation from a survey CSV on disk.

use std::fs;

use fieldwork_stats::{ShareBase, StatsError, SurveyDataset, SurveyFigures, write_readme};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const SURVEY: &str = "\
Q49,Q57,Q48,Q288R,Q260,W_WEIGHT
10,1,9,3,25,1.0
7,2,6,2,40,1.0
5,2,5,1,63,2.0
-2,1,-1,-5,-4,0.5
";

fn write_survey(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("WVS_random_subset2000.csv");
    fs::write(&path, contents).expect("write survey csv");
    path
}

#[test]
fn readme_is_written_with_weighted_figures() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_survey(&dir, SURVEY);
    let output = dir.path().join("README.md");

    let dataset = SurveyDataset::from_path(&input).expect("load survey");
    let figures = SurveyFigures::compute(&dataset, ShareBase::ValidResponses).expect("figures");
    write_readme(&figures, &output).expect("write readme");

    // life satisfaction: (10 + 7 + 2*5) / 4 = 6.75 over three valid rows
    assert_eq!(figures.life_satisfaction.valid_count, 3);
    assert!((figures.life_satisfaction.mean - 6.75).abs() < 1e-9);
    assert_eq!(figures.trust.valid_count, 4);
    assert_eq!(figures.income.valid_count, 3);

    let markdown = fs::read_to_string(&output).expect("read readme");
    assert!(markdown.contains("| Life satisfaction (Q49)      | 3   | 6.75"));
    // trust == 1 carries 1.5 of 4.5 valid weight
    assert!(markdown.contains("| Interpersonal trust (Q57)    | 4   | 33 %"));
    assert!(markdown.contains("Low 50 % • Mid 25 % • High 25 %"));
    assert!(markdown.contains("| Weight (W_WEIGHT)            | 4   |"));
}

#[test]
fn figures_serialize_for_machine_output() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_survey(&dir, SURVEY);

    let dataset = SurveyDataset::from_path(&input).expect("load survey");
    let figures = SurveyFigures::compute(&dataset, ShareBase::AllRespondents).expect("figures");
    let json = serde_json::to_value(&figures).expect("serialize");

    assert_eq!(json["share_base"], "all_respondents");
    assert_eq!(json["respondents"], 4);
    assert_eq!(json["age"]["valid_count"], 3);
    assert!(json["life_satisfaction"]["standard_deviation"].is_number());
}

#[test]
fn missing_input_file_is_an_io_error() {
    let dir = TempDir::new().expect("tempdir");
    let err = SurveyDataset::from_path(dir.path().join("absent.csv")).expect_err("no file");
    assert!(matches!(err, StatsError::Io { .. }));
}
