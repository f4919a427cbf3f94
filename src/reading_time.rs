//! Reading-time estimate for an article, used as a display hint only.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{Article, ContentBlock};
use crate::richtext;

pub const WORDS_PER_MINUTE: usize = 200;

static LINE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n|\n|\r").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadingTime {
    pub words: usize,
    pub minutes: usize,
}

/// Replace every line break with a space and trim the ends.
pub fn normalize(text: &str) -> String {
    LINE_BREAKS.replace_all(text, " ").trim().to_string()
}

/// Words after normalization; runs of whitespace count as one separator.
pub fn count_words(text: &str) -> usize {
    normalize(text).split_whitespace().count()
}

pub fn block_words(block: &ContentBlock) -> usize {
    let heading = block.heading.as_deref().map(count_words).unwrap_or(0);
    let body = count_words(&richtext::as_text(&block.paragraphs));
    heading + body
}

pub fn estimate_blocks(blocks: &[ContentBlock]) -> ReadingTime {
    let words: usize = blocks.iter().map(block_words).sum();
    ReadingTime {
        words,
        minutes: words.div_ceil(WORDS_PER_MINUTE),
    }
}

pub fn estimate(article: &Article) -> ReadingTime {
    estimate_blocks(&article.content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::richtext::RichTextSpan;

    fn block(heading: Option<&str>, paragraphs: &[&str]) -> ContentBlock {
        ContentBlock {
            heading: heading.map(str::to_string),
            paragraphs: paragraphs.iter().map(|p| RichTextSpan::paragraph(*p)).collect(),
        }
    }

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn empty_content_is_zero() {
        assert_eq!(estimate_blocks(&[]), ReadingTime { words: 0, minutes: 0 });
    }

    #[test]
    fn heading_and_paragraph() {
        let rt = estimate_blocks(&[block(Some("Hello World"), &["foo bar baz"])]);
        assert_eq!(rt, ReadingTime { words: 5, minutes: 1 });
    }

    #[test]
    fn ceiling_at_boundary() {
        assert_eq!(estimate_blocks(&[block(None, &[&words(200)])]).minutes, 1);
        assert_eq!(estimate_blocks(&[block(None, &[&words(201)])]).minutes, 2);
        assert_eq!(estimate_blocks(&[block(None, &[&words(400)])]).minutes, 2);
    }

    #[test]
    fn line_breaks_do_not_create_tokens() {
        assert_eq!(count_words("foo\n\nbar"), 2);
        assert_eq!(count_words("foo\r\nbar\rbaz"), 3);
        assert_eq!(count_words("  \n leading and trailing \r\n "), 3);
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("\n\r\n"), 0);
    }

    #[test]
    fn normalize_collapses_breaks_and_trims() {
        assert_eq!(normalize("\r\nfoo\nbar\r"), "foo bar");
    }

    #[test]
    fn heading_only_block_counts() {
        assert_eq!(block_words(&block(Some("Only a heading here"), &[])), 4);
        assert_eq!(block_words(&block(Some("   "), &[])), 0);
    }

    #[test]
    fn paragraphs_in_a_block_are_separate_words() {
        assert_eq!(block_words(&block(None, &["end", "start"])), 2);
    }

    #[test]
    fn sums_across_blocks() {
        let blocks = vec![
            block(Some("One"), &[&words(150)]),
            block(Some("Two words"), &[&words(47)]),
        ];
        let rt = estimate_blocks(&blocks);
        assert_eq!(rt.words, 200);
        assert_eq!(rt.minutes, 1);
    }
}
