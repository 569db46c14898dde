use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use leaven::config::Settings;
use leaven::dataset::Dataset;
use leaven::spec::RecipeSpec;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "leaven", version, about = "Fit-once, bake-many pipelines for tabular data")]
pub struct Cli {
    /// Path to a JSON settings file
    #[arg(long, global = true, env = "LEAVEN_CONFIG", default_value = "leaven.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Prepare a recipe and bake a CSV file with it
    Bake {
        /// Path to the JSON recipe spec
        #[arg(short, long)]
        recipe: PathBuf,

        /// CSV file to bake
        #[arg(short, long)]
        input: PathBuf,

        /// CSV file to prepare the recipe on. Defaults to the input.
        #[arg(short, long)]
        prepare: Option<PathBuf>,

        /// Where to write the baked CSV. Prints a preview when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only run steps tagged with this role (or "all"). Defaults to the configured role.
        #[arg(long)]
        role: Option<String>,
    },
    /// Build a recipe spec and list its steps without running it
    Check {
        /// Path to the JSON recipe spec
        #[arg(short, long)]
        recipe: PathBuf,
    },
}

pub fn run_command(command: Commands, settings: &Settings) -> Result<()> {
    match command {
        Commands::Bake {
            recipe,
            input,
            prepare,
            output,
            role,
        } => handle_bake(
            &recipe,
            &input,
            prepare.as_deref(),
            output.as_deref(),
            role.as_deref(),
            settings,
        ),
        Commands::Check { recipe } => handle_check(&recipe),
    }
}

fn load_spec(path: &Path) -> Result<RecipeSpec> {
    RecipeSpec::from_file(path)
        .with_context(|| format!("Failed to load recipe spec: {}", path.display()))
}

fn handle_bake(
    recipe_path: &Path,
    input: &Path,
    prepare: Option<&Path>,
    output: Option<&Path>,
    role: Option<&str>,
    settings: &Settings,
) -> Result<()> {
    let spec = load_spec(recipe_path)?;
    let mut recipe = spec.build()?;
    let role = role.unwrap_or(settings.default_role.as_str());

    let data = Dataset::from(leaven::io::load_csv(input, &settings.csv)?);
    match prepare {
        Some(path) if path != input => {
            let training = Dataset::from(leaven::io::load_csv(path, &settings.csv)?);
            recipe.prepare(&training)?;
        }
        _ => {
            recipe.prepare(&data)?;
        }
    }

    let (baked, report) = recipe.bake_with_report(&data, role)?;
    let mut baked = baked.ungroup();

    println!("Recipe: {} ({} steps)", spec.name, recipe.len());
    println!("{}", report.summary());
    match output {
        Some(path) => {
            leaven::io::save_csv(&mut baked, path, &settings.csv)?;
            println!("Saved to {}", path.display());
        }
        None => println!("{}", baked.head(Some(10))),
    }
    Ok(())
}

fn handle_check(recipe_path: &Path) -> Result<()> {
    let spec = load_spec(recipe_path)?;
    let recipe = spec.build()?;

    println!("Recipe: {} (spec version {})", spec.name, spec.version);
    for (idx, step) in recipe.steps().iter().enumerate() {
        let fitted = if step.needs_preparation() { ", fitted" } else { "" };
        println!("  {}. {} [role: {}{fitted}]", idx + 1, step.name(), step.role());
    }
    println!(
        "{} steps, {}",
        recipe.len(),
        if recipe.needs_preparation() {
            "needs preparation"
        } else {
            "stateless"
        }
    );
    Ok(())
}
