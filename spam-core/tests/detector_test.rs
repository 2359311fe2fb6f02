//! End-to-end tests for the spam detector

use spam_core::{normalize, train_artifact, Label, SpamDetector, SpamError, SpamThreshold};

/// Training emails used by the demo notebook
fn demo_corpus() -> (Vec<&'static str>, Vec<Label>) {
    let emails = vec![
        "Urgent! You've won a free iPhone. Click here now!",
        "Meeting scheduled for project review next week",
        "Get rich quick with this amazing investment opportunity!",
        "Quarterly team performance report attached",
        "Limited time offer: Massive discount on luxury watches!",
        "Client proposal for Q3 marketing strategy",
        "Congratulations! You're selected for a free cruise!",
        "Weekly team sync-up agenda and discussion points",
    ];
    let labels = vec![
        Label::Spam,
        Label::NotSpam,
        Label::Spam,
        Label::NotSpam,
        Label::Spam,
        Label::NotSpam,
        Label::Spam,
        Label::NotSpam,
    ];
    (emails, labels)
}

#[test]
fn test_free_money_is_spam() {
    let mut detector = SpamDetector::new();
    detector
        .train(
            &["free money now", "project meeting notes"],
            &[Label::Spam, Label::NotSpam],
            false,
        )
        .unwrap();

    let prediction = detector.predict("free money").unwrap();
    assert!(prediction.probability(Label::Spam) > prediction.probability(Label::NotSpam));
    assert_eq!(prediction.label, Label::Spam);
}

#[test]
fn test_out_of_vocabulary_uses_higher_prior() {
    let mut detector = SpamDetector::new();
    detector
        .train(
            &["win cash", "claim prize", "lunch tomorrow"],
            &[Label::Spam, Label::Spam, Label::NotSpam],
            false,
        )
        .unwrap();

    let prediction = detector.predict("zebra quantum 42").unwrap();
    assert_eq!(prediction.label, Label::Spam);
    assert!((prediction.spam_probability() - 2.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_out_of_vocabulary_tie_goes_to_not_spam() {
    let mut detector = SpamDetector::new();
    detector
        .train(
            &["free money now", "project meeting notes"],
            &[Label::Spam, Label::NotSpam],
            false,
        )
        .unwrap();

    let prediction = detector.predict("completely unrelated words").unwrap();
    assert_eq!(prediction.label, Label::NotSpam);
    assert!((prediction.spam_probability() - 0.5).abs() < 1e-12);

    let empty = detector.predict("").unwrap();
    assert_eq!(empty.label, Label::NotSpam);
}

#[test]
fn test_missing_class_is_insufficient_data() {
    let mut detector = SpamDetector::new();
    let err = detector
        .train(&["free money", "win a prize"], &[Label::Spam, Label::Spam], false)
        .unwrap_err();
    assert!(matches!(err, SpamError::InsufficientData(_)));
    assert!(!detector.is_trained());
}

#[test]
fn test_predict_before_train() {
    let detector = SpamDetector::new();
    assert!(matches!(detector.predict("hello"), Err(SpamError::NotTrained)));
    assert!(matches!(detector.artifact(), Err(SpamError::NotTrained)));
}

#[test]
fn test_empty_corpus_is_empty_vocabulary() {
    let mut detector = SpamDetector::new();
    let err = detector
        .train(&["$$$ 100%", "!!!"], &[Label::Spam, Label::NotSpam], false)
        .unwrap_err();
    assert!(matches!(err, SpamError::EmptyVocabulary));
}

#[test]
fn test_failed_retrain_keeps_previous_model() {
    let (emails, labels) = demo_corpus();
    let mut detector = SpamDetector::new();
    detector.train(&emails, &labels, false).unwrap();
    let before = detector.predict("free cruise offer").unwrap();

    assert!(detector.train(&["only spam"], &[Label::Spam], false).is_err());
    assert!(detector.train(&["a", "b"], &[Label::Spam], false).is_err());

    let after = detector.predict("free cruise offer").unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_distribution_is_a_probability_law() {
    let (emails, labels) = demo_corpus();
    let mut detector = SpamDetector::new();
    detector.train(&emails, &labels, false).unwrap();

    let inputs = [
        "Congratulations! You've won a free vacation!",
        "Team meeting agenda for next sprint planning",
        "free free free free free free free free free free free free free free",
        "",
        "12345",
    ];
    for prediction in detector.predict_batch(&inputs).unwrap() {
        let sum: f64 = prediction.distribution.values().sum();
        assert!((sum - 1.0).abs() < 1e-9, "sum = {}", sum);
        assert!(prediction.distribution.values().all(|p| *p >= 0.0));
    }
}

#[test]
fn test_notebook_examples() {
    let (emails, labels) = demo_corpus();
    let mut detector = SpamDetector::new();
    detector.train(&emails, &labels, false).unwrap();

    let spam = detector.predict("Congratulations! You've won a free vacation!").unwrap();
    let ham = detector.predict("Team meeting agenda for next sprint planning").unwrap();
    assert_eq!(spam.label, Label::Spam);
    assert_eq!(ham.label, Label::NotSpam);
    assert!(spam.spam_probability() > ham.spam_probability());
}

#[test]
fn test_repeated_spam_word_raises_spam_probability() {
    let (emails, labels) = demo_corpus();
    let mut detector = SpamDetector::new();
    detector.train(&emails, &labels, false).unwrap();

    let mut last = 0.0;
    for repeats in 0..10 {
        let text = format!("quarterly report {}", "free ".repeat(repeats));
        let p = detector.predict(&text).unwrap().spam_probability();
        assert!(p >= last, "P(spam) decreased at {} repeats", repeats);
        last = p;
    }
    assert!(last > 0.5);
}

#[test]
fn test_training_is_deterministic() {
    let (emails, labels) = demo_corpus();
    let (first, first_report) = train_artifact(&emails, &labels, true).unwrap();
    let (second, second_report) = train_artifact(&emails, &labels, true).unwrap();

    assert_eq!(first, second);
    assert_eq!(first_report, second_report);
    assert_eq!(first.statistics().priors().spam, 0.5);
}

#[test]
fn test_verbose_report() {
    let (emails, labels) = demo_corpus();
    let mut detector = SpamDetector::new();
    let report = detector.train(&emails, &labels, true).unwrap();

    assert_eq!(report.total_samples, 8);
    assert_eq!(report.class_counts.spam, 4);
    assert_eq!(report.vocab_size, detector.vectorizer().vocab_size());
    let metrics = report.validation.unwrap();
    assert_eq!(metrics.samples, 2);
    assert_eq!(metrics.confusion.total(), 2);
}

#[test]
fn test_vocabulary_indices_in_range() {
    let (emails, labels) = demo_corpus();
    let mut detector = SpamDetector::new();
    detector.train(&emails, &labels, false).unwrap();

    let vocabulary = detector.vectorizer().vocabulary().unwrap();
    for email in &emails {
        for token in normalize(email).split_whitespace() {
            let idx = vocabulary.get(token).unwrap();
            assert!(idx < vocabulary.len());
            assert_eq!(vocabulary.term(idx), Some(token));
        }
    }
}

#[test]
fn test_threshold_is_caller_policy() {
    let (emails, labels) = demo_corpus();
    let mut detector = SpamDetector::new();
    detector.train(&emails, &labels, false).unwrap();

    let prediction = detector.predict("free").unwrap();
    let lenient = SpamThreshold::new(0.0).unwrap();
    let strict = SpamThreshold::new(1.0).unwrap();
    assert!(lenient.is_spam(&prediction));
    assert!(!strict.is_spam(&prediction));
}
