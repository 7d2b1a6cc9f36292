use crate::config::VectorConfig;
use crate::error::{Result, TermVectorError};
use crate::utils::ustring::UString;
use crate::vectorizer::term::TermVector;

/// Code point range `start..end` of one token
pub type Span = (usize, usize);

/// Ordered token spans over one source string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanList {
    spans: Vec<Span>,
}

impl SpanList {
    pub fn new() -> Self {
        SpanList { spans: Vec::new() }
    }

    fn with_capacity(capacity: usize) -> Result<Self> {
        let mut spans = Vec::new();
        spans
            .try_reserve_exact(capacity)
            .map_err(|e| TermVectorError::out_of_memory(capacity as u64, e))?;
        Ok(SpanList { spans })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Span> {
        self.spans.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Span] {
        &self.spans
    }

    #[inline]
    fn push(&mut self, span: Span) {
        self.spans.push(span);
    }
}

impl From<Vec<Span>> for SpanList {
    fn from(spans: Vec<Span>) -> Self {
        SpanList { spans }
    }
}

impl<'a> IntoIterator for &'a SpanList {
    type Item = &'a Span;
    type IntoIter = std::slice::Iter<'a, Span>;

    fn into_iter(self) -> Self::IntoIter {
        self.spans.iter()
    }
}

/// Predicate over one code point
pub trait Checker {
    fn check(&self, c: char) -> bool;
}

impl<F> Checker for F
where
    F: Fn(char) -> bool,
{
    #[inline]
    fn check(&self, c: char) -> bool {
        self(c)
    }
}

/// Default boundary class: newline, carriage return, tab and space
#[inline]
pub fn is_blank(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\t' | ' ')
}

/// Turns a source string into token spans
pub trait Parser {
    /// # Errors
    /// `OutOfMemory` if the span list cannot be allocated
    fn parse(&self, source: &UString) -> Result<SpanList>;
}

/// CommonParser
/// Splits on code points the checker accepts and drops them.
/// Every maximal run of other code points becomes one span.
///
/// # Examples
/// ```
/// use term_vector::{CommonParser, Parser, UString};
/// let spans = CommonParser::new().parse(&UString::new("  to be\tor ")).unwrap();
/// assert_eq!(spans.as_slice(), &[(2, 4), (5, 7), (8, 10)]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CommonParser<C = fn(char) -> bool> {
    checker: C,
}

impl CommonParser<fn(char) -> bool> {
    /// Whitespace splitting
    pub fn new() -> Self {
        CommonParser { checker: is_blank }
    }
}

impl Default for CommonParser<fn(char) -> bool> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Checker> CommonParser<C> {
    pub fn with_checker(checker: C) -> Self {
        CommonParser { checker }
    }
}

impl<C: Checker> Parser for CommonParser<C> {
    fn parse(&self, source: &UString) -> Result<SpanList> {
        // runs are separated by at least one boundary
        let mut spans = SpanList::with_capacity(source.len().div_ceil(2))?;
        let mut start = None;
        for (i, c) in source.chars().enumerate() {
            if self.checker.check(c) {
                if let Some(s) = start.take() {
                    spans.push((s, i));
                }
            } else if start.is_none() {
                start = Some(i);
            }
        }
        if let Some(s) = start {
            spans.push((s, source.len()));
        }
        Ok(spans)
    }
}

/// CharParser
/// One span per code point; code points the checker accepts are dropped.
#[derive(Debug, Clone, Copy)]
pub struct CharParser<C = fn(char) -> bool> {
    checker: C,
}

impl<C: Checker> CharParser<C> {
    pub fn new(checker: C) -> Self {
        CharParser { checker }
    }
}

impl Default for CharParser<fn(char) -> bool> {
    fn default() -> Self {
        CharParser { checker: is_blank }
    }
}

impl<C: Checker> Parser for CharParser<C> {
    fn parse(&self, source: &UString) -> Result<SpanList> {
        let mut spans = SpanList::with_capacity(source.len())?;
        for (i, c) in source.chars().enumerate() {
            if !self.checker.check(c) {
                spans.push((i, i + 1));
            }
        }
        Ok(spans)
    }
}

/// Tokenizer glue
impl TermVector {
    /// Parse `source` and insert every token with weight 1
    ///
    /// # Arguments
    /// * `source` - document text
    /// * `parser` - tokenizer producing the spans
    pub fn append_parsed<P>(&mut self, source: &UString, parser: &P) -> Result<()>
    where
        P: Parser + ?Sized,
    {
        let spans = parser.parse(source)?;
        self.append_from_spans(source, &spans)
    }

    /// Build a vector from one document
    pub fn from_text<P>(text: &str, parser: &P, config: &VectorConfig) -> Result<Self>
    where
        P: Parser + ?Sized,
    {
        let mut vector = TermVector::with_config(config)?;
        vector.append_parsed(&UString::new(text), parser)?;
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorizer::compute::Compare;

    fn tokens(source: &str, spans: &SpanList) -> Vec<String> {
        let source = UString::new(source);
        spans
            .iter()
            .map(|&(s, e)| source.slice(s, e).unwrap().as_str().to_string())
            .collect()
    }

    #[test]
    fn common_parser_splits_on_whitespace() {
        let text = "\tthe  cat\r\nsat ";
        let spans = CommonParser::new().parse(&UString::new(text)).unwrap();
        assert_eq!(tokens(text, &spans), vec!["the", "cat", "sat"]);
        assert!(spans.iter().all(|&(s, e)| s < e));
    }

    #[test]
    fn common_parser_keeps_trailing_token() {
        let text = "one two";
        let spans = CommonParser::default().parse(&UString::new(text)).unwrap();
        assert_eq!(spans.as_slice(), &[(0, 3), (4, 7)]);
    }

    #[test]
    fn blank_or_empty_source_has_no_spans() {
        assert!(CommonParser::new().parse(&UString::new("")).unwrap().is_empty());
        assert!(CommonParser::new().parse(&UString::new(" \n\t ")).unwrap().is_empty());
        assert!(CharParser::default().parse(&UString::new("  ")).unwrap().is_empty());
    }

    #[test]
    fn common_parser_with_custom_checker() {
        let text = "a,b;;c d";
        let parser = CommonParser::with_checker(|c: char| c == ',' || c == ';');
        let spans = parser.parse(&UString::new(text)).unwrap();
        assert_eq!(tokens(text, &spans), vec!["a", "b", "c d"]);
    }

    #[test]
    fn char_parser_emits_one_span_per_kept_code_point() {
        let text = "日本 語!";
        let parser = CharParser::new(|c: char| c.is_whitespace() || c.is_ascii_punctuation());
        let spans = parser.parse(&UString::new(text)).unwrap();
        assert_eq!(spans.as_slice(), &[(0, 1), (1, 2), (3, 4)]);
        assert_eq!(tokens(text, &spans), vec!["日", "本", "語"]);
    }

    #[test]
    fn sentence_builds_expected_vector() {
        let vector = TermVector::from_text("the cat sat on the mat", &CommonParser::new(), &VectorConfig::default()).unwrap();
        assert_eq!(vector.len(), 5);
        assert_eq!(vector.total_count(), 6);
        assert_eq!(
            vector.sorted_dict_order_vector(),
            vec![
                ("cat".to_string(), 1),
                ("mat".to_string(), 1),
                ("on".to_string(), 1),
                ("sat".to_string(), 1),
                ("the".to_string(), 2),
            ]
        );
    }

    #[test]
    fn two_documents_compare_by_cosine() {
        let parser = CommonParser::new();
        let config = VectorConfig::default();
        let v1 = TermVector::from_text("a a b", &parser, &config).unwrap();
        let v2 = TermVector::from_text("a b b", &parser, &config).unwrap();
        assert_eq!(v1.dot_product(&v2), 4);
        assert_eq!(v1.squared_norm(), 5);
        assert_eq!(v2.squared_norm(), 5);
        let cos: f64 = v1.cosine_similarity(&v2);
        assert!((cos - 0.8).abs() < 1e-12);
    }

    #[test]
    fn append_parsed_accumulates_across_documents() {
        let parser = CharParser::default();
        let mut vector = TermVector::new().unwrap();
        vector.append_parsed(&UString::new("ab a"), &parser).unwrap();
        vector.append_parsed(&UString::new("b"), &parser).unwrap();
        assert_eq!(vector.get(&UString::new("a")), Some(2));
        assert_eq!(vector.get(&UString::new("b")), Some(2));
        assert_eq!(vector.total_count(), 4);
    }

    #[test]
    fn parser_works_behind_dyn() {
        let parsers: Vec<Box<dyn Parser>> = vec![Box::new(CommonParser::new()), Box::new(CharParser::default())];
        let source = UString::new("xy z");
        let counts: Vec<usize> = parsers.iter().map(|p| p.parse(&source).unwrap().len()).collect();
        assert_eq!(counts, vec![2, 3]);
        let mut vector = TermVector::new().unwrap();
        vector.append_parsed(&source, parsers[1].as_ref()).unwrap();
        assert_eq!(vector.len(), 3);
    }
}
