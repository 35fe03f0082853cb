//! Shared corpus and model fixtures for integration tests

#![allow(dead_code)]

use sms_data_clean::{Normalizer, RawDataset};
use spam_classifier::train::{train, TrainingParams};
use spam_classifier::SpamModel;

pub const SPAM: &[&str] = &[
    "URGENT! You have won a cash prize. Click to claim now",
    "Congratulations you won a free prize, call now to claim",
    "WINNER! Claim your prize reward, click the link urgently",
    "Free entry to win cash, text WIN to claim your prize",
    "Urgent: your mobile number won a prize. Call to claim",
    "Click here to claim your free ringtone prize now",
    "You have been selected to receive a cash award, call now",
    "Claim your guaranteed prize today, click link to win",
    "URGENT call now to claim your 2000 prize",
    "Free vouchers waiting, click to claim before they expire",
    "Win a brand new phone, text CLAIM to enter the prize draw",
    "Your account won a bonus prize, call the hotline to claim",
    "Exclusive offer: free cash prize, click now",
    "Urgent notice: prize unclaimed, call immediately to claim",
    "Text WIN now for a chance to win free cash",
    "Claim your free holiday prize, click to book now",
    "Congratulations! Urgent prize claim, call customer service",
    "You won free tickets, click the link to claim the prize",
    "Cash prize alert: claim now by calling this number",
    "Free gift card winner, click here and claim it",
];

pub const HAM: &[&str] = &[
    "Hi, how are you doing today?",
    "Hope you have a great day at work",
    "Let's meet for coffee tomorrow morning",
    "Are we still meeting for lunch tomorrow?",
    "Hi mom, I will be home for dinner tonight",
    "Great seeing you yesterday, hope the trip went well",
    "Can you pick up milk on the way home?",
    "Meet me at the library after class",
    "Hope you feel better soon, get some rest",
    "Thanks for the coffee, it was a great chat",
    "See you tomorrow at the meeting",
    "Hi, did you finish the homework?",
    "Having a lovely day at the beach with family",
    "Let's grab coffee and catch up this weekend",
    "Hope your exam went great",
    "Talk to you later tonight",
    "Happy birthday, have a great day",
    "Dinner at my place tomorrow, bring the kids",
    "Hi there, meeting moved to the afternoon",
    "Good morning, hope you slept well",
];

/// Corpus in `label<TAB>message` form, classes interleaved.
pub fn corpus_tsv() -> String {
    SPAM.iter()
        .zip(HAM)
        .flat_map(|(spam, ham)| [format!("spam\t{spam}"), format!("ham\t{ham}")])
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn corpus() -> RawDataset {
    RawDataset::from_reader(corpus_tsv().as_bytes()).expect("corpus parses")
}

/// Model fitted on the whole corpus, nothing held out.
pub fn fitted_model() -> SpamModel {
    let dataset = corpus().normalize(&Normalizer::english());
    let params = TrainingParams {
        test_fraction: 0.0,
        ..TrainingParams::default()
    };
    train(&dataset, &params).expect("training succeeds").model
}
