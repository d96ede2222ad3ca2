//! Rank skills against a free-text task description.
//!
//! Hosts pick a skill by comparing the task with each skill's `name` and
//! `description`; this reproduces that selection with plain token overlap.

use std::collections::HashSet;

use serde::Serialize;

use crate::types::SkillMetadata;

const NAME_WEIGHT: f64 = 2.0;
const DESCRIPTION_WEIGHT: f64 = 1.0;
const TAG_WEIGHT: f64 = 0.5;

const STOPWORDS: &[&str] = &[
    "an", "and", "are", "as", "at", "be", "by", "can", "do", "for", "from", "how", "in", "into",
    "is", "it", "me", "my", "of", "on", "or", "our", "please", "that", "the", "this", "to", "we",
    "what", "with", "you", "your",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillMatch {
    pub name: String,
    pub score: f64,
    /// Query tokens that hit the skill, in query order.
    pub matched_terms: Vec<String>,
}

pub struct SkillMatcher {
    min_score: f64,
    limit: usize,
}

impl SkillMatcher {
    pub fn new(min_score: f64, limit: usize) -> Self {
        Self { min_score, limit }
    }

    pub fn rank(&self, task: &str, skills: &[SkillMetadata]) -> Vec<SkillMatch> {
        let query = distinct(tokenize(task));
        if query.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<SkillMatch> = skills
            .iter()
            .filter_map(|skill| score_skill(&query, skill))
            .filter(|m| m.score >= self.min_score)
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
        matches.truncate(self.limit);
        matches
    }
}

fn score_skill(query: &[String], skill: &SkillMetadata) -> Option<SkillMatch> {
    let name: HashSet<String> = tokenize(&skill.name).into_iter().collect();
    let description: HashSet<String> = tokenize(&skill.description).into_iter().collect();
    let tags: HashSet<String> = skill.tags.iter().flat_map(|t| tokenize(t)).collect();

    let mut total = 0.0;
    let mut matched_terms = Vec::new();
    for token in query {
        let weight = if name.contains(token) {
            NAME_WEIGHT
        } else if description.contains(token) {
            DESCRIPTION_WEIGHT
        } else if tags.contains(token) {
            TAG_WEIGHT
        } else {
            continue;
        };
        total += weight;
        matched_terms.push(token.clone());
    }

    if matched_terms.is_empty() {
        return None;
    }
    Some(SkillMatch {
        name: skill.name.clone(),
        score: total / query.len() as f64,
        matched_terms,
    })
}

fn distinct(tokens: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tokens
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Lowercase word tokens. Runs of CJK characters become overlapping
/// bigrams, since those scripts do not separate words with spaces.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut cjk: Vec<char> = Vec::new();

    for c in text.chars().flat_map(char::to_lowercase) {
        if is_cjk(c) {
            flush_word(&mut word, &mut tokens);
            cjk.push(c);
        } else if c.is_alphanumeric() {
            flush_cjk(&mut cjk, &mut tokens);
            word.push(c);
        } else {
            flush_word(&mut word, &mut tokens);
            flush_cjk(&mut cjk, &mut tokens);
        }
    }
    flush_word(&mut word, &mut tokens);
    flush_cjk(&mut cjk, &mut tokens);
    tokens
}

fn flush_word(word: &mut String, tokens: &mut Vec<String>) {
    if word.chars().count() >= 2 && !STOPWORDS.contains(&word.as_str()) {
        tokens.push(word.clone());
    }
    word.clear();
}

fn flush_cjk(run: &mut Vec<char>, tokens: &mut Vec<String>) {
    match run.len() {
        0 => {},
        1 => tokens.push(run[0].to_string()),
        _ => tokens.extend(run.windows(2).map(|pair| pair.iter().collect::<String>())),
    }
    run.clear();
}

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{30ff}'   // Hiragana, Katakana
        | '\u{3400}'..='\u{4dbf}' // CJK Extension A
        | '\u{4e00}'..='\u{9fff}' // CJK Unified Ideographs
        | '\u{ac00}'..='\u{d7af}' // Hangul syllables
        | '\u{f900}'..='\u{faff}')
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest, std::path::PathBuf};

    fn skill(name: &str, description: &str, tags: &[&str]) -> SkillMetadata {
        SkillMetadata {
            name: name.into(),
            description: description.into(),
            license: None,
            homepage: None,
            version: None,
            allowed_tools: Vec::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            path: PathBuf::new(),
            source: None,
        }
    }

    fn corpus() -> Vec<SkillMetadata> {
        vec![
            skill(
                "docs-improver",
                "Analyze documentation quality and check consistency with code",
                &["markdown"],
            ),
            skill(
                "java-code-review",
                "Review Java code for style and correctness",
                &["quality"],
            ),
            skill(
                "solution-architect",
                "Draft solution architecture proposals from requirements",
                &[],
            ),
        ]
    }

    #[rstest]
    #[case("Review the Java code!", &["review", "java", "code"])]
    #[case("a b cd", &["cd"])]
    #[case("文档", &["文档"])]
    #[case("改进文档", &["改进", "进文", "文档"])]
    #[case("docs 质", &["docs", "质"])]
    #[case("", &[])]
    fn tokenizes(#[case] input: &str, #[case] expected: &[&str]) {
        assert_eq!(tokenize(input), expected);
    }

    #[test]
    fn name_hits_outrank_description_hits() {
        let matcher = SkillMatcher::new(0.1, 5);
        let ranked = matcher.rank("java code review", &corpus());
        assert_eq!(ranked[0].name, "java-code-review");
        assert!((ranked[0].score - 2.0).abs() < f64::EPSILON);
        assert_eq!(ranked[0].matched_terms, vec!["java", "code", "review"]);
        // "code" appears in the docs-improver description.
        assert_eq!(ranked[1].name, "docs-improver");
        assert!((ranked[1].score - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn tags_weigh_least() {
        let matcher = SkillMatcher::new(0.0, 5);
        let ranked = matcher.rank("markdown", &corpus());
        assert_eq!(ranked.len(), 1);
        assert!((ranked[0].score - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn min_score_limit_and_ties() {
        let skills = vec![
            skill("beta", "shared topic", &[]),
            skill("alpha", "shared topic", &[]),
        ];
        let ranked = SkillMatcher::new(0.1, 5).rank("shared", &skills);
        let names: Vec<_> = ranked.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta"]);

        assert_eq!(SkillMatcher::new(0.1, 1).rank("shared", &skills).len(), 1);
        assert!(SkillMatcher::new(1.5, 5).rank("shared", &skills).is_empty());
    }

    #[test]
    fn empty_or_stopword_query_matches_nothing() {
        let matcher = SkillMatcher::new(0.0, 5);
        assert!(matcher.rank("", &corpus()).is_empty());
        assert!(matcher.rank("the and of", &corpus()).is_empty());
    }

    #[test]
    fn repeated_query_tokens_count_once() {
        let ranked = SkillMatcher::new(0.0, 5).rank("java java java", &corpus());
        assert!((ranked[0].score - 2.0).abs() < f64::EPSILON);
    }
}
