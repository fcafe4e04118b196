use std::collections::HashSet;
use std::time::{Duration, Instant};

use pctechlibrary::libpctech::content::{default_library, Fragment};
use pctechlibrary::libpctech::question::catalog;
use pctechlibrary::libpctech::quiz::{Quiz, QuizConfig, QuizState, Step};
use pctechlibrary::libpctech::search::{Category, SearchConfig, SearchEngine};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn full_quiz_session_with_mixed_answers() {
    let mut quiz = Quiz::new(catalog().unwrap(), QuizConfig { question_count: 10 }).unwrap();
    let mut rng = StdRng::seed_from_u64(2024);
    let mut step = quiz.start(&mut rng);
    let mut seen = HashSet::new();
    let mut answered = 0;

    let result = loop {
        match step {
            Step::Question(shown) => {
                assert!(seen.insert(shown.prompt.clone()), "question repeated");
                // Right on even questions, wrong on odd ones.
                let pick = if answered % 2 == 0 {
                    shown.correct
                } else {
                    (shown.correct + 2) % shown.options.len()
                };
                quiz.submit_answer(pick).unwrap();
                answered += 1;
                step = quiz.advance(&mut rng).unwrap();
            }
            Step::Finished(result) => break result,
        }
    };

    assert_eq!(seen.len(), 10);
    assert_eq!(result.score, 5);
    assert_eq!(result.tier.headline(), "📚 Not Bad!");
    assert_eq!(quiz.state(), QuizState::Finished { score: 5 });
}

#[test]
fn larger_session_size_is_configurable() {
    let mut quiz = Quiz::new(catalog().unwrap(), QuizConfig { question_count: 15 }).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    quiz.start(&mut rng);
    let prompts: HashSet<&str> = quiz.pool().iter().map(|q| q.prompt.as_str()).collect();
    assert_eq!(prompts.len(), 15);
}

#[test]
fn search_over_builtin_library() {
    let mut engine = SearchEngine::new(default_library().unwrap(), SearchConfig::default());
    let t0 = Instant::now();
    engine.set_query("SSD", t0);
    let outcome = engine.poll(t0 + Duration::from_millis(80)).unwrap();
    assert!(outcome.any_visible);

    for card in engine.cards().iter().filter(|c| c.visible) {
        let matched = card
            .sections
            .iter()
            .filter(|s| s.visible)
            .any(|s| s.text().to_lowercase().contains("ssd"));
        assert!(matched || card.title.to_lowercase().contains("ssd"));
        for section in card.sections.iter().filter(|s| s.visible && s.open) {
            for mark in section.fragments().flat_map(Fragment::marks) {
                assert!(mark.eq_ignore_ascii_case("ssd"));
            }
        }
    }

    engine.set_category(Category::Tag("software".to_string()));
    assert!(engine.cards().iter().all(|c| !c.visible || c.category == "software"));

    let outcome = engine.set_category(Category::All).unwrap();
    assert!(outcome.any_visible);
    engine.set_query("", t0);
    engine.poll(t0 + Duration::from_secs(1)).unwrap();
    for card in engine.cards() {
        assert!(card.visible);
        assert!(card.sections.iter().all(|s| s.visible && !s.open && !s.is_highlighted()));
    }
}

#[test]
fn one_shot_filter_applies_without_waiting() {
    let mut engine = SearchEngine::new(default_library().unwrap(), SearchConfig::default());
    engine.set_category(Category::parse("hardware")).unwrap();

    let outcome = engine.apply_filter("psu");
    assert!(!engine.is_pending());
    assert!(outcome.any_visible);
    assert!(outcome.no_results.is_none());
    assert!(engine
        .cards()
        .iter()
        .filter(|c| c.visible)
        .all(|c| c.category == "hardware"));

    let outcome = engine.apply_filter("zzzz");
    assert!(!outcome.any_visible);
    assert_eq!(outcome.no_results.as_deref(), Some("No results for \"zzzz\""));
}
