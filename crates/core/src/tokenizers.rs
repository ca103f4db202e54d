//! Text tokenizers
//!
//! Provides the `Tokenizer` trait and the tokenizers used over plain-text
//! projections. Token spans are byte offsets into the projected text, so a
//! token's offset is exactly the concatenated length of the tokens before it.

use crate::mapping::CharSpan;

/// Coarse classification of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Word,
    Whitespace,
}

/// Represents a single token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The token text
    pub text: String,

    /// Position span in the projected text
    pub span: CharSpan,

    pub token_type: TokenType,
}

impl Token {
    pub fn new(text: String, span: CharSpan, token_type: TokenType) -> Self {
        Self {
            text,
            span,
            token_type,
        }
    }

    pub fn is_whitespace(&self) -> bool {
        self.token_type == TokenType::Whitespace
    }
}

/// Trait for tokenizers that split text into tokens
pub trait Tokenizer: Send + Sync {
    /// Tokenize plain text
    fn tokenize(&self, text: &str) -> Vec<Token>;

    /// Get the name of this tokenizer
    fn name(&self) -> &str;

    /// Clone this tokenizer into a Box
    fn clone_box(&self) -> Box<dyn Tokenizer>;
}

// Implement Clone for Box<dyn Tokenizer>
impl Clone for Box<dyn Tokenizer> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

// ============================================================================
// Built-in Tokenizers
// ============================================================================

/// Character-level tokenizer (splits into individual characters)
#[derive(Clone, Default)]
pub struct CharacterTokenizer;

impl Tokenizer for CharacterTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        text.char_indices()
            .map(|(pos, ch)| {
                let token_type = if ch.is_whitespace() {
                    TokenType::Whitespace
                } else {
                    TokenType::Word
                };
                Token::new(
                    ch.to_string(),
                    CharSpan::new(pos, pos + ch.len_utf8()),
                    token_type,
                )
            })
            .collect()
    }

    fn name(&self) -> &str {
        "character"
    }

    fn clone_box(&self) -> Box<dyn Tokenizer> {
        Box::new(self.clone())
    }
}

/// Word tokenizer: maximal runs of non-whitespace and of whitespace,
/// alternating. Whitespace runs are kept so that whitespace edits are
/// visible to alignment and so that offsets stay exact.
#[derive(Clone, Default)]
pub struct WordTokenizer;

impl WordTokenizer {
    pub fn new() -> Self {
        Self
    }
}

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut current_start = 0;
        let mut current_type: Option<TokenType> = None;

        for (pos, ch) in text.char_indices() {
            let char_type = classify_char(ch);
            match current_type {
                None => current_type = Some(char_type),
                Some(prev) if prev == char_type => {}
                Some(prev) => {
                    tokens.push(create_token(text, current_start, pos, prev));
                    current_start = pos;
                    current_type = Some(char_type);
                }
            }
        }

        if let Some(token_type) = current_type {
            tokens.push(create_token(text, current_start, text.len(), token_type));
        }

        tokens
    }

    fn name(&self) -> &str {
        "word"
    }

    fn clone_box(&self) -> Box<dyn Tokenizer> {
        Box::new(self.clone())
    }
}

fn classify_char(ch: char) -> TokenType {
    if ch.is_whitespace() {
        TokenType::Whitespace
    } else {
        TokenType::Word
    }
}

fn create_token(text: &str, start: usize, end: usize, token_type: TokenType) -> Token {
    Token::new(text[start..end].to_string(), CharSpan::new(start, end), token_type)
}

/// Tokenize with the default word tokenizer
pub fn tokenize(text: &str) -> Vec<Token> {
    WordTokenizer::new().tokenize(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_word_tokenizer_alternates() {
        let tokens = tokenize("The  cat\tsat.");
        assert_eq!(texts(&tokens), vec!["The", "  ", "cat", "\t", "sat."]);
        assert!(tokens[1].is_whitespace());
        assert!(!tokens[4].is_whitespace());
    }

    #[test]
    fn test_offsets_are_concatenated_lengths() {
        let text = " été  x ";
        let tokens = tokenize(text);
        let mut offset = 0;
        for token in &tokens {
            assert_eq!(token.span.start, offset);
            offset += token.text.len();
        }
        assert_eq!(offset, text.len());
    }

    #[test]
    fn test_empty_text() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_character_tokenizer() {
        let tokens = CharacterTokenizer.tokenize("a é");
        assert_eq!(texts(&tokens), vec!["a", " ", "é"]);
        assert_eq!(tokens[2].span, CharSpan::new(2, 4));
    }

    #[test]
    fn test_tokenizer_names() {
        let boxed: Box<dyn Tokenizer> = Box::new(WordTokenizer::new());
        assert_eq!(boxed.clone().name(), "word");
        assert_eq!(CharacterTokenizer.name(), "character");
    }
}
