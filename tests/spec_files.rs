//! Recipes loaded from JSON files and applied to CSV files, the way the CLI runs them.

use anyhow::Result;
use leaven::config::{CsvOptions, Settings};
use leaven::dataset::Dataset;
use leaven::spec::RecipeSpec;
use std::fs;

const RECIPE: &str = r#"{
    "version": "0.1",
    "name": "tidy shows",
    "steps": [
        {"op": "clean_column_names"},
        {"op": "string_transform", "columns": "title",
         "transformers": [{"fn": "trim"}, {"fn": "title"}]},
        {"op": "drop_duplicate_rows", "columns": "title"},
        {"op": "median_impute", "columns": {"predicate": "all_numeric"}},
        {"op": "filter_rows", "expression": "seasons >= 3", "role": "train"},
        {"op": "sort_rows", "columns": ["seasons", "title"], "ascending": false}
    ]
}"#;

const SHOWS: &str = "Title,Seasons\n lost,6\nDark,3\nlost ,6\nfargo,\nsevered,2\n";

#[test]
fn test_recipe_file_on_csv() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let recipe_path = dir.path().join("tidy.json");
    let data_path = dir.path().join("shows.csv");
    fs::write(&recipe_path, RECIPE)?;
    fs::write(&data_path, SHOWS)?;

    let spec = RecipeSpec::from_file(&recipe_path)?;
    assert_eq!(spec.name, "tidy shows");
    let mut recipe = spec.build()?;

    let data = Dataset::from(leaven::io::load_csv(&data_path, &CsvOptions::default())?);
    recipe.prepare(&data)?;

    let train = recipe.bake(&data, "train")?;
    let titles: Vec<Option<&str>> = train.frame().column("title")?.str()?.into_iter().collect();
    assert_eq!(titles, vec![Some("Lost"), Some("Fargo"), Some("Dark")]);

    let test = recipe.bake(&data, "test")?;
    assert_eq!(test.height(), 4);

    let out_path = dir.path().join("baked.csv");
    leaven::io::save_csv(&mut test.into_frame(), &out_path, &CsvOptions::default())?;
    assert!(fs::read_to_string(&out_path)?.starts_with("title,seasons"));
    Ok(())
}

#[test]
fn test_settings_file_drives_csv_options() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let settings_path = dir.path().join("leaven.json");
    fs::write(&settings_path, r#"{"csv": {"separator": ";"}, "default_role": "test"}"#)?;
    let settings = Settings::load(&settings_path)?;

    let data_path = dir.path().join("shows.csv");
    fs::write(&data_path, "title;seasons\nLost;6\nDark;3\n")?;
    let df = leaven::io::load_csv(&data_path, &settings.csv)?;

    assert_eq!(df.width(), 2);
    assert_eq!(settings.default_role, "test");
    Ok(())
}

#[test]
fn test_bad_recipe_file_is_reported() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("bad.json");
    fs::write(&path, r#"{"version": "0.1", "name": "bad", "steps": [{"op": "knead"}]}"#)?;

    let err = RecipeSpec::from_file(&path);
    assert!(
        matches!(err, Err(leaven::error::LeavenError::Construction(_))),
        "unknown op accepted"
    );
    Ok(())
}
