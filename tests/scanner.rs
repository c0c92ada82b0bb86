#[cfg(test)]
mod scanner_tests {
    use roxide as lox;

    use lox::error::LoxError;
    use lox::scanner::*;
    use lox::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source.as_bytes());
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_ternary_symbols() {
        assert_token_sequence(
            "a ? b : c;",
            &[
                (TokenType::IDENTIFIER, "a"),
                (TokenType::QUESTION_MARK, "?"),
                (TokenType::IDENTIFIER, "b"),
                (TokenType::COLON, ":"),
                (TokenType::IDENTIFIER, "c"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_keywords() {
        assert_token_sequence(
            "class static fun var super this nil",
            &[
                (TokenType::CLASS, "class"),
                (TokenType::STATIC, "static"),
                (TokenType::FUN, "fun"),
                (TokenType::VAR, "var"),
                (TokenType::SUPER, "super"),
                (TokenType::THIS, "this"),
                (TokenType::NIL, "nil"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_04_operators() {
        assert_token_sequence(
            "! != = == < <= > >= / -",
            &[
                (TokenType::BANG, "!"),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL, "="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS, "<"),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER, ">"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::SLASH, "/"),
                (TokenType::MINUS, "-"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_05_literals() {
        let source = "\"hello\" 12.5 42";
        let (tokens, errors) = scan_tokens(source.as_bytes());

        assert!(errors.is_empty());
        assert_eq!(tokens.len(), 4);

        match &tokens[0].token_type {
            TokenType::STRING(s) => assert_eq!(s, "hello"),
            other => panic!("expected string token, got {:?}", other),
        }
        assert_eq!(tokens[0].lexeme, "\"hello\"");

        match tokens[1].token_type {
            TokenType::NUMBER(n) => assert_eq!(n, 12.5),
            ref other => panic!("expected number token, got {:?}", other),
        }

        match tokens[2].token_type {
            TokenType::NUMBER(n) => assert_eq!(n, 42.0),
            ref other => panic!("expected number token, got {:?}", other),
        }
    }

    #[test]
    fn test_scanner_06_block_comment_skipped() {
        assert_token_sequence(
            "1 /* anything, even * or / alone */ 2",
            &[
                (TokenType::NUMBER(1.0), "1"),
                (TokenType::NUMBER(2.0), "2"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_07_block_comment_tracks_lines() {
        let source = "1 /* first\nsecond\nthird */ 2";
        let (tokens, errors) = scan_tokens(source.as_bytes());

        assert!(errors.is_empty());
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].line, 3);
    }

    #[test]
    fn test_scanner_08_unclosed_block_comment() {
        let (tokens, errors) = scan_tokens(b"1 /* never closed");

        // The number before the comment and the EOF both survive.
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].token_type, TokenType::EOF);

        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("Unclosed block comment."));
    }

    #[test]
    fn test_scanner_09_unterminated_string() {
        let (_, errors) = scan_tokens(b"\"no closing quote");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("Unterminated string."));
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let source = ",.$(#";
        let scanner = Scanner::new(source.as_bytes());

        // Collect all results (both tokens and errors)
        let results: Vec<_> = scanner.collect();

        // Debug output to see actual sequence
        println!("\nActual token/error sequence:");
        for (i, res) in results.iter().enumerate() {
            match res {
                Ok(t) => println!("{}: {:?} '{}'", i, t.token_type, t.lexeme),
                Err(e) => println!("{}: Error: {}", i, e),
            }
        }

        // We expect this sequence:
        // 0: COMMA ','
        // 1: DOT '.'
        // 2: Error for '$'
        // 3: LEFT_PAREN '('
        // 4: Error for '#'
        // 5: EOF

        // Verify we got 6 items (2 valid tokens, 2 errors, 1 valid token, EOF)
        assert_eq!(results.len(), 6, "Expected 6 items in result");

        // Check valid tokens
        assert_token_matches(&results[0], TokenType::COMMA, ",");
        assert_token_matches(&results[1], TokenType::DOT, ".");
        assert_token_matches(&results[3], TokenType::LEFT_PAREN, "(");
        assert_token_matches(&results[5], TokenType::EOF, "");

        // Check errors - we don't assume positions, just that they exist
        let error_count = results.iter().filter(|r| r.is_err()).count();
        assert_eq!(error_count, 2, "Expected 2 error messages");

        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            let rendered = err.to_string();
            assert!(
                rendered.contains("Unexpected character"),
                "Error message should contain 'Unexpected character', got: {}",
                rendered
            );
        }

        // Helper function
        fn assert_token_matches(
            result: &Result<Token<'_>, LoxError>,
            expected_type: TokenType,
            expected_lexeme: &str,
        ) {
            match result {
                Ok(token) => {
                    assert_eq!(
                        token.token_type, expected_type,
                        "Expected token type {:?}, got {:?}",
                        expected_type, token.token_type
                    );
                    assert_eq!(
                        token.lexeme, expected_lexeme,
                        "Expected lexeme '{}', got '{}'",
                        expected_lexeme, token.lexeme
                    );
                }
                Err(e) => panic!("Expected token but got error: {}", e),
            }
        }
    }
}
