/// Upper bound on chunk size, counted in characters because the source text
/// is Korean and byte lengths would triple the budget.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 1000;

/// Split a label section into retrieval-sized chunks, preferring sentence
/// boundaries (`.`/`!`/`?` followed by whitespace, delimiter kept with the
/// sentence it closes). Sentences are accumulated greedily while the running
/// character count stays at or under `max_chars`; a single sentence longer
/// than the limit becomes its own oversized chunk rather than being cut.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if text.chars().count() <= max_chars {
        return vec![trimmed.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for segment in sentence_segments(text) {
        let segment_len = segment.chars().count();
        if current_len + segment_len <= max_chars {
            current.push_str(&segment);
            current_len += segment_len;
        } else {
            push_trimmed(&mut chunks, &current);
            current = segment;
            current_len = segment_len;
        }
    }
    push_trimmed(&mut chunks, &current);

    chunks
}

fn push_trimmed(chunks: &mut Vec<String>, chunk: &str) {
    let trimmed = chunk.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

/// Sentence-like segments: each ends after a `.`/`!`/`?` plus the whitespace
/// run that follows it. Trailing text without such a boundary forms the last
/// segment.
fn sentence_segments(text: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            let mut closed = false;
            while let Some(ws) = chars.next_if(|next| next.is_whitespace()) {
                current.push(ws);
                closed = true;
            }
            if closed {
                segments.push(std::mem::take(&mut current));
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(split_text("", 1000).is_empty());
        assert!(split_text("   \n", 1000).is_empty());
    }

    #[test]
    fn short_input_is_a_single_trimmed_chunk() {
        assert_eq!(split_text("  해열 및 진통  ", 1000), vec!["해열 및 진통"]);
    }

    #[test]
    fn splits_on_sentence_boundaries() {
        let text = "첫 문장입니다. 둘째 문장입니다. 셋째 문장입니다.";
        let chunks = split_text(text, 12);
        assert_eq!(
            chunks,
            vec!["첫 문장입니다.", "둘째 문장입니다.", "셋째 문장입니다."]
        );
    }

    #[test]
    fn greedy_accumulation_keeps_sentences_together() {
        let text = "하나. 둘. 셋. 넷. 다섯 여섯. 일곱 여덟. 아홉 열 끝.";
        let chunks = split_text(text, 12);
        assert!(chunks.len() >= 2);
        // No chunk exceeds the limit; together they carry every sentence.
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 12, "oversized chunk: {chunk}");
        }
    }

    #[test]
    fn every_chunk_respects_the_length_bound() {
        let sentence = "아세트아미노펜은 해열과 진통에 사용됩니다. ";
        let text = sentence.repeat(120);
        let max = 100;
        for chunk in split_text(&text, max) {
            assert!(chunk.chars().count() <= max);
        }
    }

    #[test]
    fn concatenation_round_trips_modulo_boundary_trimming() {
        let sentence = "이 약은 식후 삼십분에 복용하십시오. ";
        let text = sentence.repeat(40);
        let chunks = split_text(&text, 120);

        let rebuilt: String = chunks.join(" ");
        let normalize = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ");
        assert_eq!(normalize(&rebuilt), normalize(&text));
    }

    #[test]
    fn oversized_sentence_is_not_subdivided() {
        let long_sentence = "가".repeat(50);
        let text = format!("짧은 문장. {long_sentence}. 마무리 문장.");
        let chunks = split_text(&text, 20);

        assert!(
            chunks.iter().any(|c| c.chars().count() > 20),
            "the oversized sentence must survive intact"
        );
        let oversized = chunks
            .iter()
            .find(|c| c.chars().count() > 20)
            .expect("oversized chunk");
        assert!(oversized.contains(&long_sentence));
    }

    #[test]
    fn punctuation_without_whitespace_is_not_a_boundary() {
        let segments = sentence_segments("버전 1.5를 복용. 다음 문장");
        assert_eq!(segments, vec!["버전 1.5를 복용. ", "다음 문장"]);
    }

    #[test]
    fn chunk_order_matches_source_order() {
        let text = "하나 문장입니다. 둘 문장입니다. 셋 문장입니다. 넷 문장입니다.";
        let chunks = split_text(text, 20);
        let joined = chunks.join(" ");
        let first = joined.find("하나").expect("first");
        let second = joined.find("둘").expect("second");
        let third = joined.find("셋").expect("third");
        assert!(first < second && second < third);
    }
}
