use std::io::Read;
use std::path::Path;

use anyhow::Context;
use clap::Parser;
use serde_json::json;
use sms_data_clean::RawDataset;
use spam_classifier::config::{LogFormat, LoggingConfig, Settings};
use spam_classifier::train::{train, Evaluation};
use spam_classifier::{Normalizer, Outcome, SpamDetector, SpamModel, TextStatistics};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;

use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    init_logging(&settings.logging, cli.verbose);

    match cli.command {
        Commands::Classify {
            text,
            file,
            model_dir,
            json,
        } => {
            let model_dir = model_dir.unwrap_or(settings.model_dir);
            let model = SpamModel::load(&model_dir)?;
            let detector = SpamDetector::from_model(Normalizer::english(), model);

            let raw = read_message(text, file.as_deref())?;
            let outcome = detector.classify(&raw);
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome_json(&raw, &outcome))?);
            } else {
                print_report(&outcome);
            }
            if matches!(outcome, Outcome::Failed(_)) {
                std::process::exit(1);
            }
        }

        Commands::Normalize { text } => {
            let raw = read_message(text, None)?;
            let normalizer = Normalizer::english();
            println!("{}", normalizer.normalize(&raw));
            print_stats(&normalizer.stats(&raw));
        }

        Commands::Train {
            dataset,
            output,
            test_fraction,
            alpha,
            max_features,
        } => {
            let mut params = settings.training.params();
            if let Some(test_fraction) = test_fraction {
                params.test_fraction = test_fraction;
            }
            if let Some(alpha) = alpha {
                params.alpha = alpha;
            }
            if let Some(max_features) = max_features {
                params.max_features = (max_features > 0).then_some(max_features);
            }

            let raw = RawDataset::from_file(&dataset)
                .with_context(|| format!("failed to read {}", dataset.display()))?;
            let summary = raw.summary();
            println!(
                "Messages: {} ({} spam, {} ham)",
                summary.total, summary.spam, summary.ham
            );

            let report = train(&raw.normalize(&Normalizer::english()), &params)?;
            let output = output.unwrap_or(settings.model_dir);
            let paths = report.model.save(&output)?;
            println!("Trained on {} messages", report.train_samples);
            println!("Features:  {}", report.model.vectorizer.vocabulary().len());
            if let Some(evaluation) = report.evaluation {
                print_evaluation(&evaluation);
            }
            println!("Wrote {} and {}", paths.vectorizer.display(), paths.classifier.display());
        }

        Commands::Summary { dataset } => {
            let raw = RawDataset::from_file(&dataset)
                .with_context(|| format!("failed to read {}", dataset.display()))?;
            let summary = raw.summary();
            println!("Total messages:     {}", summary.total);
            println!(
                "Spam messages:      {} ({:.1}%)",
                summary.spam,
                summary.spam_ratio() * 100.0
            );
            println!(
                "Ham messages:       {} ({:.1}%)",
                summary.ham,
                (1.0 - summary.spam_ratio()) * 100.0
            );
            println!("Avg message length: {:.0} characters", summary.average_length);
        }
    }

    Ok(())
}

fn init_logging(config: &LoggingConfig, verbose: bool) {
    let level = if verbose { "debug" } else { config.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("spam_classifier={level},sms_data_clean={level}"))
    });

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

/// Message from the argument, a text file, or stdin.
fn read_message(text: Option<String>, file: Option<&Path>) -> anyhow::Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(file) = file {
        return std::fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()));
    }
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read stdin")?;
    Ok(buffer)
}

fn outcome_json(raw: &str, outcome: &Outcome) -> serde_json::Value {
    match outcome {
        Outcome::Classified(analysis) => json!({
            "sms": raw,
            "spam": analysis.result.label.is_spam(),
            "label": analysis.result.label,
            "confidence": analysis.result.confidence,
            "probabilities": {
                "not_spam": analysis.result.probabilities[0],
                "spam": analysis.result.probabilities[1],
            },
            "processed": analysis.canonical,
            "stats": analysis.stats,
        }),
        other => json!({
            "sms": raw,
            "outcome": other,
        }),
    }
}

fn print_report(outcome: &Outcome) {
    match outcome {
        Outcome::Empty => println!("Please enter some text to classify."),
        Outcome::Failed(failure) => {
            eprintln!("An error occurred during prediction: {}", failure.cause)
        }
        Outcome::Classified(analysis) => {
            let result = &analysis.result;
            if result.label.is_spam() {
                println!("Spam Detected");
                println!("This message has been identified as potential spam.");
            } else {
                println!("Not Spam");
                println!("This message appears to be legitimate and safe.");
            }
            println!("Confidence: {:.2}%", result.confidence * 100.0);
            println!();
            print_stats(&analysis.stats);
            println!();
            println!("Processed text:");
            println!("  {}", analysis.canonical);
        }
    }
}

fn print_stats(stats: &TextStatistics) {
    println!("Message statistics:");
    println!("  Word count:        {}", stats.word_count);
    println!("  Characters:        {}", stats.original_length);
    println!("  Sentences:         {}", stats.sentence_count);
    println!("  Numbers:           {}", stats.number_count);
    println!("  Uppercase:         {}", stats.uppercase_count);
    println!("  Punctuation:       {}", stats.punctuation_count);
    println!("  Processed length:  {}", stats.processed_length);
    println!("  Processed words:   {}", stats.processed_word_count);
}

fn print_evaluation(evaluation: &Evaluation) {
    let score = |value: Option<f64>| {
        value
            .map(|v| format!("{:.4}", v))
            .unwrap_or_else(|| "n/a".to_string())
    };
    println!("Held-out messages: {}", evaluation.samples);
    println!("  Accuracy:  {:.4}", evaluation.accuracy);
    println!("  Precision: {}", score(evaluation.precision));
    println!("  Recall:    {}", score(evaluation.recall));
    println!("  F1:        {}", score(evaluation.f1));
}
