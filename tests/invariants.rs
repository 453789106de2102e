use std::collections::HashSet;

use termpairs::config::PartitionFamily;
use termpairs::pairs::{PairKey, fold};
use termpairs::{
    DatasetError, NegativeAccumulator, NegativeSampler, NegativeStrategy, PairIndex,
    SamplerConfig, TermPair, dedup_pairs, term_distance,
};

const STRATEGIES: [NegativeStrategy; 2] =
    [NegativeStrategy::Random, NegativeStrategy::MinimalDistance];

fn pair(a: &str, b: &str) -> TermPair {
    TermPair::new(a, b).unwrap()
}

fn pairs(rows: &[(&str, &str)]) -> Vec<TermPair> {
    rows.iter().map(|(a, b)| pair(a, b)).collect()
}

fn clinical_partition() -> Vec<TermPair> {
    pairs(&[
        ("Myocardial infarction", "Heart attack"),
        ("Pyrexia", "Fever"),
        ("Cephalalgia", "Headache"),
        ("Bronchial asthma", "Asthma"),
        ("Hypertension", "High blood pressure"),
        ("Hypotension", "Low blood pressure"),
        ("Emesis", "Vomiting"),
        ("Pruritus", "Itching"),
        ("Syncope", "Fainting"),
        ("Dyspnoea", "Shortness of breath"),
        ("Epistaxis", "Nosebleed"),
        ("Insomnia", "Sleeplessness"),
        ("Alopecia", "Hair loss"),
        ("Vertigo", "Dizziness"),
        ("Rhinitis", "Runny nose"),
        ("Otitis media", "Middle ear infection"),
    ])
}

fn second_partition() -> Vec<TermPair> {
    pairs(&[
        ("Hyperglycaemia", "High blood sugar"),
        ("Hypoglycaemia", "Low blood sugar"),
        ("Tachycardia", "Fast heart rate"),
        ("Bradycardia", "Slow heart rate"),
        ("Dysphagia", "Difficulty swallowing"),
        ("Haematuria", "Blood in urine"),
        ("Arthralgia", "Joint pain"),
        ("Myalgia", "Muscle pain"),
    ])
}

fn sampler(seed: u64) -> NegativeSampler {
    NegativeSampler::new(SamplerConfig {
        seed,
        ..SamplerConfig::default()
    })
}

#[test]
fn negatives_never_collide_with_positives_or_each_other() {
    let positives = clinical_partition();
    let corpus = PairIndex::from_pairs(&positives);
    for strategy in STRATEGIES {
        for seed in 0..8 {
            let sample = sampler(seed)
                .sample(strategy, &positives, &corpus, &PairIndex::new())
                .unwrap();
            assert_eq!(sample.len(), positives.len(), "{strategy} seed {seed}");

            let mut seen = HashSet::new();
            for (negative, distance) in sample.pairs.iter().zip(&sample.distances) {
                assert!(!corpus.contains_pair(negative), "{strategy}: {negative:?}");
                assert!(
                    !corpus.contains(&negative.target, &negative.source),
                    "{strategy}: reversed {negative:?}"
                );
                assert!(negative.is_valid());
                assert!(seen.insert(negative.key()), "{strategy}: repeated {negative:?}");
                assert_eq!(*distance, term_distance(&negative.source, &negative.target));
            }
        }
    }
}

#[test]
fn same_seed_reproduces_identical_samples() {
    let positives = clinical_partition();
    let corpus = PairIndex::from_pairs(&positives);
    for strategy in STRATEGIES {
        let first = sampler(42)
            .sample(strategy, &positives, &corpus, &PairIndex::new())
            .unwrap();
        let second = sampler(42)
            .sample(strategy, &positives, &corpus, &PairIndex::new())
            .unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn negatives_do_not_repeat_across_partitions_of_one_run() {
    let first = clinical_partition();
    let second = second_partition();
    let mut corpus = PairIndex::from_pairs(&first);
    corpus.extend(&second);

    for strategy in STRATEGIES {
        let sampler = sampler(42);
        let mut accumulator = NegativeAccumulator::new();
        let mut all: HashSet<PairKey> = HashSet::new();
        for partition in [&first, &second] {
            let sample = sampler
                .sample(strategy, partition, &corpus, accumulator.to_consider())
                .unwrap();
            for negative in &sample.pairs {
                assert!(all.insert(negative.key()), "{strategy}: {negative:?} repeated");
            }
            accumulator.record(PartitionFamily::Substitution, &sample.pairs);
        }
    }
}

#[test]
fn minimal_distance_skips_synonyms_and_their_partners() {
    let positives = pairs(&[
        ("Pain", "Ache"),
        ("Pain", "Soreness"),
        ("Soreness", "Tenderness"),
        ("Rain", "Shower"),
        ("Paint", "Colour"),
    ]);
    let corpus = PairIndex::from_pairs(&positives);
    let sample = sampler(42)
        .sample(
            NegativeStrategy::MinimalDistance,
            &positives,
            &corpus,
            &PairIndex::new(),
        )
        .unwrap();

    let pain_targets: HashSet<String> = sample
        .pairs
        .iter()
        .filter(|negative| negative.source == "Pain")
        .map(|negative| fold(&negative.target))
        .collect();
    assert_eq!(pain_targets.len(), 2);
    for excluded in ["ache", "soreness", "tenderness"] {
        assert!(!pain_targets.contains(excluded), "picked {excluded}");
    }
    // Rain and Paint are both one edit away from Pain.
    assert_eq!(
        pain_targets,
        HashSet::from(["rain".to_string(), "paint".to_string()])
    );
}

#[test]
fn minimal_distance_takes_the_closest_candidate_first() {
    let positives = clinical_partition();
    let corpus = PairIndex::from_pairs(&positives);
    let sample = sampler(42)
        .sample(
            NegativeStrategy::MinimalDistance,
            &positives,
            &corpus,
            &PairIndex::new(),
        )
        .unwrap();

    // Sources are visited in sorted order, so the first group sees every
    // other row's terms as candidates.
    let first_source = positives
        .iter()
        .map(|positive| positive.source.as_str())
        .min()
        .unwrap();
    let closest = positives
        .iter()
        .filter(|positive| positive.source != first_source)
        .flat_map(|positive| [&positive.source, &positive.target])
        .map(|term| term_distance(first_source, term))
        .min()
        .unwrap();
    let (_, chosen) = sample
        .pairs
        .iter()
        .zip(&sample.distances)
        .find(|(negative, _)| negative.source == first_source)
        .unwrap();
    assert_eq!(*chosen, closest);
}

#[test]
fn single_row_partition_exhausts_random_draws() {
    let positives = pairs(&[("Diabetes", "Diabetes mellitus")]);
    let sampler = NegativeSampler::new(SamplerConfig {
        random_draw_limit: 1_000,
        ..SamplerConfig::default()
    });
    let result = sampler.sample(
        NegativeStrategy::Random,
        &positives,
        &PairIndex::new(),
        &PairIndex::new(),
    );
    assert!(matches!(
        result,
        Err(DatasetError::Exhausted { ref source_term, requested: 1, produced: 0 })
            if source_term == "Diabetes"
    ));
}

#[test]
fn diabetes_pair_gets_one_valid_random_negative() {
    let positives = pairs(&[("Diabetes", "Diabetes mellitus"), ("Gout", "Podagra")]);
    let corpus = PairIndex::new();
    let sample = sampler(42)
        .sample(NegativeStrategy::Random, &positives, &corpus, &PairIndex::new())
        .unwrap();
    let negative = &sample.pairs[0];
    assert!(["Diabetes", "Diabetes mellitus"].contains(&negative.source.as_str()));
    assert!(fold(&negative.source) != fold(&negative.target));
    assert!(!PairIndex::from_pairs(&positives).contains_pair(negative));
}

#[test]
fn dedup_is_idempotent_and_keeps_one_orientation() {
    for seed in 0..8u64 {
        let mut rows = clinical_partition();
        let reversed: Vec<TermPair> = rows
            .iter()
            .skip(seed as usize)
            .step_by(3)
            .map(TermPair::reversed)
            .collect();
        rows.extend(reversed);
        rows.extend(clinical_partition().into_iter().take(seed as usize));

        let once = dedup_pairs(rows.clone());
        let twice = dedup_pairs(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once.len(), clinical_partition().len());
        let keys: HashSet<PairKey> = once.iter().map(TermPair::key).collect();
        assert_eq!(keys.len(), once.len());
    }
}

#[test]
fn levenshtein_basics_hold() {
    assert_eq!(term_distance("abc", "abd"), 1);
    assert_eq!(term_distance("Fever", "fever"), 0);
    for (a, b) in [("Pyrexia", "Fever"), ("Heart attack", "Myocardial infarction")] {
        assert_eq!(term_distance(a, b), term_distance(b, a));
    }
}
