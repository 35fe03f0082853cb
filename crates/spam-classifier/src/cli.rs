use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "spam-classifier")]
#[command(author, version, about = "Classify SMS messages as spam or not spam")]
#[command(propagate_version = true)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true, env = "SPAM_CLASSIFIER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify one message
    Classify {
        /// Message text; read from stdin when neither TEXT nor --file is given
        text: Option<String>,

        /// Read the message from a UTF-8 text file
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Directory searched for the model artifacts
        #[arg(short, long, env = "SPAM_CLASSIFIER_MODEL_DIR")]
        model_dir: Option<PathBuf>,

        /// Print a JSON object instead of a report
        #[arg(long)]
        json: bool,
    },

    /// Show the processed text and statistics for a message
    Normalize {
        /// Message text; read from stdin when omitted
        text: Option<String>,
    },

    /// Fit the model from a labelled corpus and write the artifacts
    Train {
        /// Corpus in `label<TAB>message` lines
        dataset: PathBuf,

        /// Output directory for vectorizer.json and mnb_model.json
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Share of messages held out for scoring
        #[arg(long)]
        test_fraction: Option<f64>,

        /// Additive smoothing
        #[arg(long)]
        alpha: Option<f64>,

        /// Vocabulary cap (0 keeps every term)
        #[arg(long)]
        max_features: Option<usize>,
    },

    /// Print corpus figures
    Summary {
        /// Corpus in `label<TAB>message` lines
        dataset: PathBuf,
    },
}
