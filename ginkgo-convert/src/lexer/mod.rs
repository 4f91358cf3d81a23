//! Lexer implementation using logos

mod token;

pub use token::Token;

use crate::ast::Span;
use crate::error::{ConvertError, Result};
use logos::Logos;

/// Tokenize Go source code
///
/// Newlines are consumed here: a newline (or a block comment spanning lines)
/// that follows a statement-ending token becomes a `Token::Semi`, the way the
/// Go scanner inserts semicolons. Comments stay in the stream.
pub fn tokenize(source: &str) -> Result<Vec<(Token, Span)>> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);
    let mut last_significant: Option<Token> = None;

    while let Some(result) = lexer.next() {
        let span = Span::new(lexer.span().start, lexer.span().end);
        let token = match result {
            Ok(token) => token,
            Err(_) => {
                return Err(ConvertError::lexer(
                    format!("unexpected character: {:?}", lexer.slice()),
                    span,
                ));
            }
        };

        match token {
            Token::Newline => {
                if insert_semicolon(&mut last_significant) {
                    tokens.push((Token::Semi, span));
                }
            }
            Token::BlockComment(ref text) if text.contains('\n') => {
                if insert_semicolon(&mut last_significant) {
                    tokens.push((Token::Semi, Span::new(span.start, span.start)));
                }
                tokens.push((token, span));
            }
            Token::LineComment(_) | Token::BlockComment(_) => tokens.push((token, span)),
            _ => {
                last_significant = Some(token.clone());
                tokens.push((token, span));
            }
        }
    }

    if insert_semicolon(&mut last_significant) {
        tokens.push((Token::Semi, Span::new(source.len(), source.len())));
    }

    Ok(tokens)
}

fn insert_semicolon(last: &mut Option<Token>) -> bool {
    let insert = last.as_ref().is_some_and(Token::ends_statement);
    if insert {
        *last = Some(Token::Semi);
    }
    insert
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|(t, _)| t)
            .collect()
    }

    #[test]
    fn test_tokenize_empty() {
        let tokens = tokenize("").unwrap();
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_tokenize_keywords() {
        assert_eq!(
            kinds("package import func var const type"),
            vec![Token::Package, Token::Import, Token::Func, Token::Var, Token::Const, Token::Type]
        );
    }

    #[test]
    fn test_tokenize_identifier_before_keyword_prefix() {
        let tokens = kinds("funcs ranger");
        assert!(matches!(&tokens[0], Token::Ident(s) if s == "funcs"));
        assert!(matches!(&tokens[1], Token::Ident(s) if s == "ranger"));
    }

    #[test]
    fn test_tokenize_numbers_keep_source_text() {
        let tokens = kinds("42 0x1F 1.5e3 .25 3i 1_000");
        let texts: Vec<_> = tokens
            .iter()
            .filter_map(|t| match t {
                Token::Number(s) => Some(s.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["42", "0x1F", "1.5e3", ".25", "3i", "1_000"]);
    }

    #[test]
    fn test_tokenize_strings() {
        let tokens = kinds(r#""hello \"world\"" `raw
string`"#);
        assert!(matches!(&tokens[0], Token::Str(s) if s == r#""hello \"world\"""#));
        assert!(matches!(&tokens[1], Token::Str(s) if s.starts_with('`') && s.contains('\n')));
    }

    #[test]
    fn test_tokenize_rune_literals() {
        let tokens = kinds(r"'a' '\n' 'é'");
        assert_eq!(tokens.iter().filter(|t| matches!(t, Token::Char(_))).count(), 3);
    }

    #[test]
    fn test_tokenize_compound_operators() {
        assert_eq!(
            kinds("&^= <<= := ... <- &&"),
            vec![
                Token::AmpCaretEq,
                Token::ShlEq,
                Token::ColonEq,
                Token::Ellipsis,
                Token::Arrow,
                Token::AndAnd
            ]
        );
    }

    #[test]
    fn test_semicolon_inserted_after_identifier_line() {
        assert_eq!(
            kinds("x\ny"),
            vec![
                Token::Ident("x".into()),
                Token::Semi,
                Token::Ident("y".into()),
                Token::Semi
            ]
        );
    }

    #[test]
    fn test_no_semicolon_after_operator_line() {
        assert_eq!(
            kinds("a +\nb"),
            vec![
                Token::Ident("a".into()),
                Token::Plus,
                Token::Ident("b".into()),
                Token::Semi
            ]
        );
    }

    #[test]
    fn test_no_semicolon_after_open_brace_or_comma() {
        let tokens = kinds("f(a,\nb)\n{\n}");
        let semis = tokens.iter().filter(|t| **t == Token::Semi).count();
        assert_eq!(semis, 2);
    }

    #[test]
    fn test_semicolon_inserted_before_line_comment_newline() {
        let tokens = kinds("return // done\nx");
        assert_eq!(tokens[0], Token::Return);
        assert!(matches!(tokens[1], Token::LineComment(_)));
        assert_eq!(tokens[2], Token::Semi);
    }

    #[test]
    fn test_multiline_block_comment_acts_as_newline() {
        let tokens = kinds("x /* a\nb */ y");
        assert_eq!(tokens[1], Token::Semi);
        assert!(matches!(tokens[2], Token::BlockComment(_)));
    }

    #[test]
    fn test_single_line_block_comment_does_not_end_statement() {
        let tokens = kinds("x /* a */ + y");
        assert!(!tokens[..3].contains(&Token::Semi));
    }

    #[test]
    fn test_block_comment_text_and_span() {
        let tokens = tokenize("/* a * b / c **/x").unwrap();
        assert_eq!(tokens[0].0, Token::BlockComment("/* a * b / c **/".into()));
        assert_eq!(tokens[0].1, Span::new(0, 16));
        assert_eq!(tokens[1].0, Token::Ident("x".into()));
    }

    #[test]
    fn test_unterminated_block_comment_error() {
        assert!(tokenize("x /* never closed").is_err());
    }

    #[test]
    fn test_tokenize_spans() {
        let tokens = tokenize("func main").unwrap();
        assert_eq!(tokens[0].1, Span::new(0, 4));
        assert_eq!(tokens[1].1, Span::new(5, 9));
    }

    #[test]
    fn test_tokenize_unexpected_character_error() {
        let result = tokenize("x := 1 @ 2");
        let err = result.unwrap_err();
        assert!(err.message().contains("unexpected character"));
    }
}
