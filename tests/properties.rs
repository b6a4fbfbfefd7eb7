use bpe_subword::{BPE, BpeTrainer, Error, ExhaustionPolicy, MergeTable, Variant};

const VARIANTS: [Variant; 2] = [Variant::BoundaryAware, Variant::BoundaryFree];

fn trained(variant: Variant, corpus: &str, merges: usize) -> BPE {
    let mut bpe = BPE::new(variant);
    bpe.train(corpus, merges).expect("training succeeds");
    bpe
}

fn learned_tokens(bpe: &BPE) -> Vec<Vec<u8>> {
    bpe.merge_table()
        .merges()
        .iter()
        .filter_map(|rule| bpe.token_bytes(rule.id).map(<[u8]>::to_vec))
        .collect()
}

fn samples() -> Vec<String> {
    let mut samples: Vec<String> = [
        "",
        " ",
        "\n\n\t ",
        "The quick brown fox jumps.",
        "Hello world! This is a test.",
        "We're sure they'll say it's 42, aren't we?",
        "こんにちは世界",
        "I love 🍎 pie 🙂🙂",
        "naïve café — résumé",
        "Ελληνικά και Кириллица",
        "line one\nline two\r\nline three\n",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    // deterministic mixes of 1-4 byte characters and whitespace
    let alphabet = ['a', 'b', ' ', 'é', '中', '🙂', '\n', '1', '!', '\''];
    let mut state = 7u32;
    for len in [1usize, 2, 5, 13, 40] {
        let text: String = (0..len)
            .map(|_| {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                alphabet[(state >> 16) as usize % alphabet.len()]
            })
            .collect();
        samples.push(text);
    }
    samples
}

#[test]
fn round_trip_untrained_and_trained() {
    let corpus = "the cat sat on the mat. the 🐈 sat on the mat again! 日本語の文章です。";
    for variant in VARIANTS {
        let untrained = BPE::new(variant);
        let trained = trained(variant, corpus, 30);
        for text in samples() {
            assert_eq!(untrained.decode(&untrained.encode(&text)).unwrap(), text);
            assert_eq!(
                trained.decode(&trained.encode(&text)).unwrap(),
                text,
                "{variant:?} failed to round trip {text:?}"
            );
        }
    }
}

#[test]
fn round_trip_on_training_text() {
    for variant in VARIANTS {
        for (corpus, merges) in [
            ("The quick brown fox jumps.", 10),
            ("Hello world! This is a test.", 20),
        ] {
            let bpe = trained(variant, corpus, merges);
            assert_eq!(bpe.decode(&bpe.encode(corpus)).unwrap(), corpus);
        }
    }
}

#[test]
fn vocab_grows_by_requested_merges() {
    for variant in VARIANTS {
        let bpe = trained(variant, "ababababab", 5);
        assert_eq!(bpe.vocab_size(), 261);

        let bpe = trained(variant, "abc", 2);
        assert_eq!(bpe.vocab_size(), 258);
    }
}

#[test]
fn stop_policy_grows_at_most_requested() {
    for variant in VARIANTS {
        let trainer = BpeTrainer::builder()
            .exhaustion(ExhaustionPolicy::Stop)
            .build();
        let mut bpe = BPE::with_trainer(variant, trainer);
        let summary = bpe.train("ababababab", 5).unwrap();
        assert_eq!(bpe.vocab_size(), 256 + summary.merges_learned);
        assert!(bpe.vocab_size() < 261);
        assert_eq!(summary.placeholders, 0);
    }
}

#[test]
fn training_is_deterministic() {
    let corpus = "low lower lowest newer newest wider widest ".repeat(10);
    for variant in VARIANTS {
        let a = trained(variant, &corpus, 25);
        let b = trained(variant, &corpus, 25);
        assert_eq!(a.merge_table(), b.merge_table());
        assert_eq!(
            serde_json::to_string(a.merge_table()).unwrap(),
            serde_json::to_string(b.merge_table()).unwrap()
        );
    }
}

#[test]
fn boundary_free_merges_across_words() {
    let corpus = "the ".repeat(50);
    let free = trained(Variant::BoundaryFree, &corpus, 5);
    let ids = free.encode("ether");
    let has_the = ids.iter().any(|&id| free.token_bytes(id) == Some(&b"the"[..]));
    assert!(has_the, "expected a 'the' token inside 'ether', got {ids:?}");
    assert_eq!(free.decode(&ids).unwrap(), "ether");
    assert!(learned_tokens(&free).contains(&b"the ".to_vec()));
}

#[test]
fn boundary_aware_never_absorbs_a_trailing_space() {
    let corpus = "the ".repeat(50);
    let aware = trained(Variant::BoundaryAware, &corpus, 5);
    for token in learned_tokens(&aware) {
        assert!(
            !(token.len() > 1 && token.ends_with(b" ")),
            "boundary-aware learned {:?}",
            String::from_utf8_lossy(&token)
        );
    }
    assert!(learned_tokens(&aware).contains(&b" the".to_vec()));
}

#[test]
fn space_is_an_ordinary_symbol_without_pre_tokenization() {
    let corpus = "a a a a ".repeat(20);
    let free = trained(Variant::BoundaryFree, &corpus, 5);
    assert!(learned_tokens(&free).contains(&b"a ".to_vec()));
}

#[test]
fn unseen_text_falls_back_to_bytes() {
    for variant in VARIANTS {
        let bpe = trained(variant, "apple", 2);
        let ids = bpe.encode("apricot");
        assert_eq!(bpe.decode(&ids).unwrap(), "apricot");
        assert!(ids.contains(&u32::from(b'r')));
    }
}

#[test]
fn empty_input() {
    for variant in VARIANTS {
        for bpe in [BPE::new(variant), trained(variant, "some text to learn from", 8)] {
            assert!(bpe.encode("").is_empty());
            assert_eq!(bpe.decode(&[]).unwrap(), "");
        }
    }
}

#[test]
fn multibyte_text_survives_training() {
    let emoji_run = "🙂".repeat(10);
    let cases = [
        ("こんにちは", 10),
        ("I love 🍎 pie", 5),
        (emoji_run.as_str(), 3),
        ("Ελληνικά Ελληνικά", 6),
    ];
    for variant in VARIANTS {
        for (corpus, merges) in cases {
            let bpe = trained(variant, corpus, merges);
            assert_eq!(bpe.decode(&bpe.encode(corpus)).unwrap(), corpus);
        }
    }

    let emoji = trained(Variant::BoundaryFree, &emoji_run, 3);
    assert_eq!(emoji.encode("🙂").len(), 1);
}

#[test]
fn multiline_corpus() {
    for variant in VARIANTS {
        let bpe = trained(variant, "Line 1\nLine 2\nLine 3", 5);
        assert_eq!(bpe.decode(&bpe.encode("Line 2")).unwrap(), "Line 2");
    }
}

#[test]
fn unknown_id_fails_without_side_effects() {
    let bpe = trained(Variant::BoundaryAware, "hello hello", 3);
    let before = bpe.clone();
    let err = bpe.decode(&[104, 9_999]).unwrap_err();
    assert!(matches!(err, Error::UnknownSymbolId(9_999)));
    assert_eq!(bpe, before);
}

#[test]
fn exported_table_imports_identically() {
    let bpe = trained(Variant::BoundaryFree, &"ab ab ab cd cd ".repeat(5), 12);
    let json = serde_json::to_string(bpe.merge_table()).unwrap();
    let table: MergeTable = serde_json::from_str(&json).unwrap();
    assert_eq!(&table, bpe.merge_table());

    let restored = BPE::from_merge_table(Variant::BoundaryFree, table);
    let text = "ab cd ab ef";
    assert_eq!(restored.encode(text), bpe.encode(text));
}

#[test]
fn retraining_extends_the_vocabulary() {
    let mut bpe = BPE::new(Variant::BoundaryAware);
    bpe.train("hello hello hello", 2).unwrap();
    let first = bpe.merge_table().merges().to_vec();
    bpe.train("hello world world", 3).unwrap();
    assert_eq!(bpe.vocab_size(), 261);
    assert_eq!(&bpe.merge_table().merges()[..first.len()], &first[..]);
    assert_eq!(bpe.decode(&bpe.encode("hello world")).unwrap(), "hello world");
}

#[test]
fn concurrent_encoding_shares_a_finished_tokenizer() {
    let bpe = trained(Variant::BoundaryAware, &"shared read only table ".repeat(8), 20);
    let inputs = ["shared", "read only", "table table", "nothing in common"];
    let expected: Vec<_> = inputs.iter().map(|t| bpe.encode(t)).collect();

    let shared = &bpe;
    std::thread::scope(|scope| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|&text| scope.spawn(move || shared.encode(text)))
            .collect();
        let got: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(got, expected);
    });
    assert_eq!(bpe.encode_batch(&inputs), expected);
}
