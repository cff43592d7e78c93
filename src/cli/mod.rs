//! Heartrisk CLI Module
//!
//! Command-line interface for inspecting, cleaning, training and scoring.

use clap::{Parser, Subcommand};
use colored::*;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::AppConfig;
use crate::inference::{Prediction, PredictionRecord, RecordValue, RiskLevel};
use crate::preprocessing::PreprocessSummary;
use crate::session::{Session, Stage};
use crate::training::{EvaluationMetrics, TrainingConfig, N_ESTIMATORS_RANGE, TEST_FRACTION_RANGE};
use crate::utils::DataLoader;
use crate::visualization;

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn line_box_center(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let total_pad = W.saturating_sub(visible_len);
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {}  {}{}{} {}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

fn line_box_empty() { line_box(""); }

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn step_warn(msg: &str) {
    println!("  {} {}", "!".yellow().bold(), msg.yellow());
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn wait_enter() {
    println!();
    println!("  {}", dim("press enter to continue"));
    let mut input = String::new();
    let _ = std::io::stdin().read_line(&mut input);
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "heartrisk")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Heart-attack risk explorer: clean data, train a random forest, score a record")]
#[command(long_about = None)]
pub struct Cli {
    /// JSON configuration file (schema, loader, training)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show an overview of an uploaded dataset
    Info {
        /// Input CSV file
        #[arg(short, long)]
        data: PathBuf,
    },

    /// Clean a dataset and optionally export it
    Preprocess {
        /// Input CSV file
        #[arg(short, long)]
        data: PathBuf,

        /// Write the cleaned table to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Clean a dataset, train a random forest and evaluate it
    Train {
        /// Input CSV file
        #[arg(short, long)]
        data: PathBuf,

        /// Number of trees (50-500)
        #[arg(long)]
        n_estimators: Option<usize>,

        /// Held-out test fraction (0.1-0.4)
        #[arg(long)]
        test_fraction: Option<f64>,

        /// Print the evaluation as JSON
        #[arg(long)]
        json: bool,
    },

    /// Train on a dataset and score one record
    Predict {
        /// Input CSV file used for training
        #[arg(short, long)]
        data: PathBuf,

        /// Feature value as name=value, repeated for every feature
        #[arg(short = 's', long = "set", value_name = "NAME=VALUE", num_args = 1..)]
        values: Vec<String>,
    },
}

// ─── Setup ─────────────────────────────────────────────────────────────────────

/// Load the configuration file, or the defaults when none is given
pub fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => Ok(AppConfig::from_file(path)?),
        None => Ok(AppConfig::default()),
    }
}

fn new_session(config: &AppConfig) -> Session {
    Session::with_schema(config.schema.clone())
        .with_loader(DataLoader::with_config(config.loader.clone()))
}

fn upload(session: &mut Session, data_path: &Path) -> anyhow::Result<()> {
    step_run("Loading data");
    let start = Instant::now();
    let raw = session.upload_path(data_path)?;
    step_done(&format!("{} rows × {} cols in {:?}", raw.height(), raw.width(), start.elapsed()));
    Ok(())
}

fn run_preprocess(session: &mut Session) -> anyhow::Result<()> {
    step_run("Cleaning");
    let summary = session.preprocess()?;
    step_done(&format!(
        "{} → {} rows in {:.3}s",
        summary.rows_before, summary.rows_after, summary.elapsed_secs
    ));
    Ok(())
}

fn run_train(session: &mut Session, config: &TrainingConfig) -> anyhow::Result<()> {
    step_run(&format!("Training {} trees", config.n_estimators));
    let metrics = session.train(config)?;
    step_done(&format!("{:.3}s", metrics.training_time_secs));
    Ok(())
}

// ─── Printing ──────────────────────────────────────────────────────────────────

fn print_overview(session: &Session) -> anyhow::Result<()> {
    let overview = session.overview()?;

    println!("  {:<12} {}", muted("Rows"), overview.rows);
    println!("  {:<12} {}", muted("Columns"), overview.columns);
    println!("  {:<12} {:.2} MB", muted("Memory"), overview.estimated_size_bytes as f64 / 1024.0 / 1024.0);
    println!("  {:<12} {}", muted("Missing"), overview.missing_total);
    println!("  {:<12} {}", muted("Duplicates"), overview.duplicate_rows);
    println!();

    println!("  {:<26} {:<10} {:>8} {:>6}", muted("Column"), muted("Type"), muted("Non-null"), muted("Nulls"));
    println!("  {}", dim(&"─".repeat(54)));
    for col in &overview.column_info {
        println!(
            "  {:<26} {:<10} {:>8} {:>6}",
            col.name,
            col.dtype.truecolor(140, 140, 140),
            col.non_null,
            col.null
        );
    }
    println!();
    Ok(())
}

fn print_summary(summary: &PreprocessSummary) {
    section("Cleaning Summary");
    println!("  {:<20} {}", muted("Rows before"), summary.rows_before);
    println!("  {:<20} {}", muted("Rows after"), summary.rows_after);
    println!("  {:<20} {}", muted("Rows removed"), summary.rows_removed());
    println!("  {:<20} {}", muted("Duplicates removed"), summary.duplicates_removed);
    println!("  {:<20} {}", muted("Missing before"), summary.missing_total_before());
    println!("  {:<20} {}", muted("Missing after"), summary.missing_total_after);
    if !summary.encoded_columns.is_empty() {
        println!("  {:<20} {}", muted("Encoded columns"), summary.encoded_columns.join(", "));
    }

    let with_missing: Vec<_> = summary.missing_values_before.iter().filter(|m| m.count > 0).collect();
    if !with_missing.is_empty() {
        println!();
        println!("  {:<26} {:>8}", muted("Column"), muted("Missing"));
        println!("  {}", dim(&"─".repeat(36)));
        for m in with_missing {
            println!("  {:<26} {:>8}", m.column, m.count);
        }
    }
}

fn print_describe(session: &Session) -> anyhow::Result<()> {
    let clean = session.require_clean()?;
    section("Statistics");
    println!(
        "  {:<26} {:>9} {:>9} {:>9} {:>9} {:>9}",
        muted("Column"), muted("Mean"), muted("Std"), muted("Min"), muted("Median"), muted("Max")
    );
    println!("  {}", dim(&"─".repeat(76)));
    for stats in clean.describe() {
        println!(
            "  {:<26} {:>9} {:>9} {:>9} {:>9} {:>9}",
            stats.name,
            fmt_opt(stats.mean),
            fmt_opt(stats.std),
            fmt_opt(stats.min),
            fmt_opt(stats.median),
            fmt_opt(stats.max)
        );
    }
    Ok(())
}

fn print_metrics(session: &Session, metrics: &EvaluationMetrics) -> anyhow::Result<()> {
    section("Evaluation");
    println!("  {:<16} {}", muted("Accuracy"), format!("{:.4}", metrics.accuracy).white().bold());
    println!("  {:<16} {} / {}", muted("Train / test"), metrics.n_train, metrics.n_test);
    println!("  {:<16} {}", muted("Trees"), metrics.config.n_estimators);
    println!("  {:<16} {}", muted("Time"), format!("{:.3}s", metrics.training_time_secs).white());

    let cm = &metrics.confusion_matrix;
    section("Confusion Matrix");
    println!("  {:<14} {:>12} {:>12}", "", muted("pred 0"), muted("pred 1"));
    println!("  {:<14} {:>12} {:>12}", muted("actual 0"), cm.true_negatives(), cm.false_positives());
    println!("  {:<14} {:>12} {:>12}", muted("actual 1"), cm.false_negatives(), cm.true_positives());

    section("Classification Report");
    println!(
        "  {:<14} {:>10} {:>10} {:>10} {:>9}",
        "", muted("precision"), muted("recall"), muted("f1-score"), muted("support")
    );
    for report in &metrics.class_reports {
        println!(
            "  {:<14} {:>10.4} {:>10.4} {:>10.4} {:>9}",
            report.class, report.precision, report.recall, report.f1_score, report.support
        );
    }
    for (label, avg) in [("macro avg", &metrics.macro_avg), ("weighted avg", &metrics.weighted_avg)] {
        println!(
            "  {:<14} {:>10.4} {:>10.4} {:>10.4} {:>9}",
            label, avg.precision, avg.recall, avg.f1_score, avg.support
        );
    }

    let model = session.require_model()?;
    section("Top Features");
    for (rank, fi) in visualization::importance_ranking(model, 10).iter().enumerate() {
        let bar = "█".repeat((fi.importance * 100.0).round() as usize);
        println!("  {:>2}. {:<26} {:>7.4} {}", rank + 1, fi.feature, fi.importance, accent(&bar));
    }
    println!();
    Ok(())
}

fn print_prediction(prediction: &Prediction) {
    let headline = match prediction.risk_level {
        RiskLevel::High => prediction.risk_level.headline().red().bold(),
        RiskLevel::Moderate => prediction.risk_level.headline().yellow().bold(),
        RiskLevel::Low => prediction.risk_level.headline().green().bold(),
    };
    let verdict = if prediction.predicted_class == 1 { "at risk" } else { "not at risk" };

    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", headline));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Prediction  ", verdict));
    line_box(&kv("Probability ", &format!("{:.1}%", prediction.probability * 100.0)));
    line_box(&kv("Risk level  ", &prediction.risk_level.to_string()));
    line_box_empty();
    line_box_bottom();

    section("Recommendations");
    for advice in prediction.risk_level.advice() {
        println!("  {} {}", dim("·"), advice);
    }
    println!();
    println!("  {}", dim("General guidance only, not a medical diagnosis."));
    println!();
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_info(config: &AppConfig, data_path: &Path) -> anyhow::Result<()> {
    section("Data Info");
    let mut session = new_session(config);
    upload(&mut session, data_path)?;
    println!();
    println!("  {:<12} {}", muted("File"), data_path.display());
    print_overview(&session)
}

pub fn cmd_preprocess(config: &AppConfig, data_path: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    section("Preprocess");
    let mut session = new_session(config);
    upload(&mut session, data_path)?;
    run_preprocess(&mut session)?;

    if let Some(summary) = session.summary() {
        print_summary(summary);
    }
    print_describe(&session)?;

    if let Some(output) = output {
        let clean = session.require_clean()?;
        println!();
        step_run(&format!("Saving → {}", output.display()));
        let mut df = clean.to_dataframe()?;
        let mut file = std::fs::File::create(output)?;
        CsvWriter::new(&mut file).finish(&mut df)?;
        step_done(&format!("{} rows × {} cols", df.height(), df.width()));
    }

    println!();
    Ok(())
}

pub fn cmd_train(
    config: &AppConfig,
    data_path: &Path,
    n_estimators: Option<usize>,
    test_fraction: Option<f64>,
    json: bool,
) -> anyhow::Result<()> {
    let mut training = config.training.clone();
    if let Some(n) = n_estimators {
        training = training.with_n_estimators(n);
    }
    if let Some(f) = test_fraction {
        training = training.with_test_fraction(f);
    }
    training.validate()?;

    if !json {
        section("Train");
    }
    let mut session = new_session(config);
    if json {
        session.upload_path(data_path)?;
        session.preprocess()?;
        let metrics = session.train(&training)?;
        println!("{}", serde_json::to_string_pretty(metrics)?);
        return Ok(());
    }

    upload(&mut session, data_path)?;
    run_preprocess(&mut session)?;
    run_train(&mut session, &training)?;
    if let Some(metrics) = session.metrics() {
        print_metrics(&session, metrics)?;
    }
    Ok(())
}

pub fn cmd_predict(config: &AppConfig, data_path: &Path, values: &[String]) -> anyhow::Result<()> {
    let record = PredictionRecord::from_pairs(values)?;

    section("Predict");
    let mut session = new_session(config);
    upload(&mut session, data_path)?;
    run_preprocess(&mut session)?;
    run_train(&mut session, &config.training)?;

    let prediction = session.predict(&record)?;
    print_prediction(&prediction);
    Ok(())
}

// ─── Interactive mode ──────────────────────────────────────────────────────────

/// Input bounds and default offered for each heart-attack feature
const FIELD_BOUNDS: &[(&str, f64, f64, f64)] = &[
    ("age", 18.0, 100.0, 40.0),
    ("hypertension", 0.0, 1.0, 0.0),
    ("blood_pressure_systolic", 80.0, 250.0, 120.0),
    ("blood_pressure_diastolic", 50.0, 150.0, 80.0),
    ("diabetes", 0.0, 1.0, 0.0),
    ("cholesterol_level", 80.0, 400.0, 200.0),
    ("cholesterol_hdl", 10.0, 120.0, 40.0),
    ("cholesterol_ldl", 10.0, 300.0, 120.0),
    ("triglycerides", 30.0, 600.0, 150.0),
    ("fasting_blood_sugar", 50.0, 400.0, 100.0),
    ("obesity", 0.0, 1.0, 0.0),
    ("waist_circumference", 50.0, 200.0, 85.0),
    ("previous_heart_disease", 0.0, 1.0, 0.0),
    ("smoking_status", 0.0, 2.0, 0.0),
    ("physical_activity", 0.0, 2.0, 0.0),
];

fn field_bounds(name: &str) -> Option<(f64, f64, f64)> {
    FIELD_BOUNDS
        .iter()
        .find(|(field, ..)| *field == name)
        .map(|&(_, min, max, default)| (min, max, default))
}

fn print_banner() {
    println!();
    println!();
    println!("       {}", "╻ ╻┏━╸┏━┓┏━┓╺┳╸┏━┓╻┏━┓╻┏".truecolor(255, 130, 130));
    println!("       {}", "┣━┫┣╸ ┣━┫┣┳┛ ┃ ┣┳┛┃┗━┓┣┻┓".truecolor(240, 110, 110));
    println!("       {}", "╹ ╹┗━╸╹ ╹╹┗╸ ╹ ╹┗╸╹┗━┛╹ ╹".truecolor(220, 90, 90));
    println!();
    println!("       {}", dim(&format!("Heart-attack risk explorer  ·  v{}", env!("CARGO_PKG_VERSION"))));
    println!();
}

fn print_status(session: &Session) {
    let stage = session.stage();
    let steps = [Stage::RawLoaded, Stage::Cleaned, Stage::Trained];
    let line: Vec<String> = steps
        .iter()
        .map(|s| {
            if stage >= *s {
                format!("{} {}", ok("●"), s.description())
            } else {
                format!("{} {}", dim("○"), muted(s.description()))
            }
        })
        .collect();
    let sep = format!("  {}  ", dim("›"));
    println!("  {}", line.join(sep.as_str()));
}

fn theme() -> dialoguer::theme::ColorfulTheme {
    use dialoguer::theme::ColorfulTheme;

    ColorfulTheme {
        active_item_prefix: dialoguer::console::style("  ›".to_string()).for_stderr().cyan(),
        active_item_style: dialoguer::console::Style::new().for_stderr().white().bold(),
        inactive_item_prefix: dialoguer::console::style("   ".to_string()).for_stderr(),
        inactive_item_style: dialoguer::console::Style::new().for_stderr().color256(245),
        prompt_prefix: dialoguer::console::style("  ?".to_string()).for_stderr().color256(111),
        prompt_style: dialoguer::console::Style::new().for_stderr().white().bold(),
        ..ColorfulTheme::default()
    }
}

fn page_upload(session: &mut Session, theme: &dialoguer::theme::ColorfulTheme) -> anyhow::Result<()> {
    use dialoguer::Input;

    section("Upload Dataset");
    let path: String = Input::with_theme(theme)
        .with_prompt("CSV file")
        .interact_text()?;

    upload(session, Path::new(path.trim()))?;
    println!();
    print_overview(session)
}

fn page_preprocess(session: &mut Session) -> anyhow::Result<()> {
    section("Preprocessing Data");
    run_preprocess(session)?;
    if let Some(summary) = session.summary() {
        print_summary(summary);
    }
    print_describe(session)
}

fn page_train(
    session: &mut Session,
    defaults: &TrainingConfig,
    theme: &dialoguer::theme::ColorfulTheme,
) -> anyhow::Result<()> {
    use dialoguer::Input;

    section("Analysis / Training");
    session.require_clean()?;

    let n_estimators: usize = Input::with_theme(theme)
        .with_prompt(format!(
            "Number of trees ({}-{})",
            N_ESTIMATORS_RANGE.start(),
            N_ESTIMATORS_RANGE.end()
        ))
        .default(defaults.n_estimators)
        .validate_with(|n: &usize| {
            if N_ESTIMATORS_RANGE.contains(n) { Ok(()) } else { Err("out of range") }
        })
        .interact_text()?;
    let test_fraction: f64 = Input::with_theme(theme)
        .with_prompt(format!(
            "Test fraction ({}-{})",
            TEST_FRACTION_RANGE.start(),
            TEST_FRACTION_RANGE.end()
        ))
        .default(defaults.test_fraction)
        .validate_with(|f: &f64| {
            if TEST_FRACTION_RANGE.contains(f) { Ok(()) } else { Err("out of range") }
        })
        .interact_text()?;

    let config = defaults
        .clone()
        .with_n_estimators(n_estimators)
        .with_test_fraction(test_fraction);
    run_train(session, &config)?;
    if let Some(metrics) = session.metrics() {
        print_metrics(session, metrics)?;
    }
    Ok(())
}

fn page_visualize(session: &Session) -> anyhow::Result<()> {
    let clean = session.require_clean()?;
    let target = &session.schema().target;

    section("Target Distribution");
    let dist = visualization::target_distribution(clean, target)?;
    println!("  {:<16} {}", muted("Class 0"), dist.negative);
    println!("  {:<16} {}", muted("Class 1"), dist.positive);
    println!("  {:<16} {:.1}%", muted("Ratio 1:0"), dist.ratio_percent);

    if clean.column_index("age").is_some() {
        section("Age Distribution");
        let hist = visualization::age_histogram(clean)?;
        let peak = hist.counts.iter().copied().max().unwrap_or(0).max(1);
        for (i, count) in hist.counts.iter().enumerate() {
            let bar = "█".repeat(count * 30 / peak);
            println!("  {:>6.1}-{:<6.1} {:>5} {}", hist.edges[i], hist.edges[i + 1], count, accent(&bar));
        }
    }

    section("Strongest Correlations");
    let corr = visualization::correlation_matrix(clean);
    for (name, r) in corr.strongest_with(target, 10)? {
        println!("  {:<26} {:>7.4}", name, r);
    }

    if let Some(model) = session.model() {
        section("Feature Importance");
        for fi in visualization::importance_ranking(model, 10) {
            println!("  {:<26} {:>7.4}", fi.feature, fi.importance);
        }
    }
    println!();
    Ok(())
}

fn page_predict(session: &Session, theme: &dialoguer::theme::ColorfulTheme) -> anyhow::Result<()> {
    use dialoguer::{Input, Select};

    section("Predict");
    let model = session.require_model()?;
    let codebook = model.codebook();

    let mut record = PredictionRecord::new();
    for name in model.feature_names() {
        if let Some(categories) = codebook.categories(name) {
            let idx = Select::with_theme(theme)
                .with_prompt(name)
                .items(categories)
                .default(0)
                .interact()?;
            record.insert(name.clone(), RecordValue::Category(categories[idx].clone()));
            continue;
        }

        let (min, max, default) = field_bounds(name).unwrap_or((f64::MIN, f64::MAX, 0.0));
        let value: f64 = Input::with_theme(theme)
            .with_prompt(format!("{} ({}-{})", name, min, max))
            .default(default)
            .validate_with(move |v: &f64| {
                if (min..=max).contains(v) { Ok(()) } else { Err("out of range") }
            })
            .interact_text()?;
        record.insert(name.clone(), value);
    }

    let prediction = session.predict(&record)?;
    print_prediction(&prediction);
    Ok(())
}

pub fn cmd_interactive(config: &AppConfig) -> anyhow::Result<()> {
    use dialoguer::Select;

    print_banner();
    let theme = theme();
    let mut session = new_session(config);

    loop {
        let items = &[
            "Upload Dataset        load a CSV file",
            "Preprocess            dedup, drop missing, encode",
            "Train                 random forest + evaluation",
            "Visualize             distributions & correlations",
            "Predict               score one person",
            "Reset                 start a new session",
            "Exit",
        ];

        println!();
        print_status(&session);
        println!();
        let sel = Select::with_theme(&theme)
            .with_prompt("What would you like to do")
            .items(items)
            .default(0)
            .interact_opt()?;

        let outcome = match sel {
            Some(0) => page_upload(&mut session, &theme),
            Some(1) => page_preprocess(&mut session),
            Some(2) => page_train(&mut session, &config.training, &theme),
            Some(3) => page_visualize(&session),
            Some(4) => page_predict(&session, &theme),
            Some(5) => {
                session.reset();
                step_ok("Session cleared");
                Ok(())
            }
            Some(6) | None => {
                println!();
                println!("  {}", dim("goodbye"));
                println!();
                break;
            }
            _ => Ok(()),
        };

        if let Err(e) = outcome {
            println!();
            step_warn(&e.to_string());
        }
        wait_enter();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_train_args() {
        let cli = Cli::parse_from([
            "heartrisk", "train", "-d", "heart.csv", "--n-estimators", "100", "--json",
        ]);
        match cli.command {
            Some(Commands::Train { data, n_estimators, test_fraction, json }) => {
                assert_eq!(data, PathBuf::from("heart.csv"));
                assert_eq!(n_estimators, Some(100));
                assert_eq!(test_fraction, None);
                assert!(json);
            }
            _ => panic!("expected train command"),
        }
    }

    #[test]
    fn test_parse_predict_values() {
        let cli = Cli::parse_from([
            "heartrisk", "-c", "app.json", "predict", "-d", "heart.csv", "-s", "age=50", "-s", "diabetes=1",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("app.json")));
        match cli.command {
            Some(Commands::Predict { values, .. }) => assert_eq!(values, vec!["age=50", "diabetes=1"]),
            _ => panic!("expected predict command"),
        }
    }

    #[test]
    fn test_field_bounds_cover_schema() {
        for name in crate::schema::FEATURE_COLUMNS {
            assert!(field_bounds(name).is_some(), "no bounds for {}", name);
        }
        assert_eq!(field_bounds("age"), Some((18.0, 100.0, 40.0)));
    }

    #[test]
    fn test_strip_ansi() {
        let colored = format!("{}", "abc".red());
        assert_eq!(strip_ansi(&colored), "abc");
    }
}
