//! Whole-document tokenization checks against the Hack grammar
//!
//! Each test lexes a small document with `tokenize_lines` and checks individual tokens by
//! line and index, comparing full scope stacks where the exact shape matters.

use hhlex::hhlex::testing::assert_tokens;
use hhlex::hhlex::{Grammar, Lexer, Scope, Token};
use std::sync::Arc;

fn tokenize(text: &str) -> Vec<Vec<Token>> {
    Lexer::new(Arc::new(Grammar::hack().expect("built-in grammar"))).tokenize_lines(text)
}

/// The ambient embedded-code stack followed by `leaves`.
fn code(leaves: &[Scope]) -> Vec<Scope> {
    let mut scopes = vec![Scope::TextHtmlHack, Scope::EmbeddedBlock, Scope::SourceHack];
    scopes.extend_from_slice(leaves);
    scopes
}

const FUNCTION_ARGS: [Scope; 2] = [Scope::Function, Scope::Arguments];

#[test]
fn test_assignment() {
    let tokens = tokenize("<?hh\n$test = 2;");
    assert_tokens(&tokens[1])
        .count(7)
        .token(0, |t| {
            t.value("$")
                .scopes(&code(&[Scope::Variable, Scope::VariablePunctuation]));
        })
        .token(1, |t| {
            t.value("test").scopes(&code(&[Scope::Variable]));
        })
        .token(2, |t| {
            t.value(" ").scopes(&code(&[]));
        })
        .token(3, |t| {
            t.value("=").scopes(&code(&[Scope::AssignmentOperator]));
        })
        .token(5, |t| {
            t.value("2").scopes(&code(&[Scope::Numeric]));
        })
        .token(6, |t| {
            t.value(";").scopes(&code(&[Scope::Terminator]));
        });
}

#[test]
fn test_arithmetic_operators() {
    for operator in ["+", "-", "*", "/", "%"] {
        let tokens = tokenize(&format!("<?hh\n1 {} 2;", operator));
        assert_tokens(&tokens[1])
            .values(&["1", " ", operator, " ", "2", ";"])
            .token(0, |t| {
                t.scopes(&code(&[Scope::Numeric]));
            })
            .token(1, |t| {
                t.scopes(&code(&[]));
            })
            .token(2, |t| {
                t.scopes(&code(&[Scope::ArithmeticOperator]));
            })
            .token(4, |t| {
                t.scopes(&code(&[Scope::Numeric]));
            })
            .token(5, |t| {
                t.scopes(&code(&[Scope::Terminator]));
            });
    }
}

#[test]
fn test_compound_assignments() {
    let cases = [
        ("+=", Scope::AssignmentOperator),
        ("-=", Scope::AssignmentOperator),
        ("*=", Scope::AssignmentOperator),
        ("/=", Scope::AssignmentOperator),
        ("%=", Scope::AssignmentOperator),
        (".=", Scope::StringOperator),
        ("&=", Scope::AssignmentOperator),
        ("|=", Scope::AssignmentOperator),
        ("^=", Scope::AssignmentOperator),
        ("<<=", Scope::AssignmentOperator),
        (">>=", Scope::AssignmentOperator),
    ];
    for (operator, scope) in cases {
        let tokens = tokenize(&format!("<?hh\n$test {} 2;", operator));
        assert_tokens(&tokens[1])
            .values(&["$", "test", " ", operator, " ", "2", ";"])
            .token(3, |t| {
                t.scopes(&code(&[scope]));
            })
            .token(5, |t| {
                t.scopes(&code(&[Scope::Numeric]));
            });
    }
}

#[test]
fn test_heredoc() {
    let tokens = tokenize("<?hh\n$x = <<<EOTXT\ntest {$str}\nEOTXT;");
    assert_tokens(&tokens[1])
        .token(5, |t| {
            t.value("<<<").has(Scope::Heredoc).leaf(Scope::HeredocOperator);
        })
        .token(6, |t| {
            t.value("EOTXT").has(Scope::Heredoc).leaf(Scope::HeredocOperator);
        });
    assert_tokens(&tokens[2])
        .values(&["test ", "{", "$", "str", "}"])
        .all_have(Scope::Heredoc)
        .token(2, |t| {
            t.has(Scope::Variable);
        });
    assert_tokens(&tokens[3])
        .values(&["EOTXT", ";"])
        .token(0, |t| {
            t.has(Scope::Heredoc).leaf(Scope::HeredocOperator);
        })
        .token(1, |t| {
            t.lacks(Scope::Heredoc).leaf(Scope::Terminator);
        });
}

#[test]
fn test_namespace_on_open_tag_line() {
    let tokens = tokenize("<?hh namespace Test;");
    assert_tokens(&tokens[0])
        .values(&["<?hh", " ", "namespace", " ", "Test", ";"])
        .token(1, |t| {
            t.scopes(&code(&[Scope::Namespace]));
        })
        .token(2, |t| {
            t.scopes(&code(&[Scope::Namespace, Scope::NamespaceKeyword]));
        })
        .token(3, |t| {
            t.scopes(&code(&[Scope::Namespace]));
        })
        .token(4, |t| {
            t.scopes(&code(&[Scope::Namespace, Scope::NamespaceName]));
        })
        .token(5, |t| {
            t.scopes(&code(&[Scope::Terminator]));
        });
}

#[test]
fn test_namespace_on_own_line() {
    let tokens = tokenize("<?hh\nnamespace Test;");
    assert_tokens(&tokens[1])
        .count(4)
        .token(0, |t| {
            t.value("namespace")
                .scopes(&code(&[Scope::Namespace, Scope::NamespaceKeyword]));
        })
        .token(1, |t| {
            t.value(" ").scopes(&code(&[Scope::Namespace]));
        })
        .token(2, |t| {
            t.value("Test")
                .scopes(&code(&[Scope::Namespace, Scope::NamespaceName]));
        })
        .token(3, |t| {
            t.value(";").scopes(&code(&[Scope::Terminator]));
        });
}

#[test]
fn test_array_parameter_with_legacy_default() {
    let tokens = tokenize("<?hh\nfunction array_test(array $value = array()) {}");
    let param = |leaf: &[Scope]| {
        let mut scopes = FUNCTION_ARGS.to_vec();
        scopes.push(Scope::ArgumentArray);
        scopes.extend_from_slice(leaf);
        code(&scopes)
    };
    assert_tokens(&tokens[1])
        .count(18)
        .token(0, |t| {
            t.value("function")
                .scopes(&code(&[Scope::Function, Scope::FunctionStorage]));
        })
        .token(1, |t| {
            t.value(" ").scopes(&code(&[Scope::Function]));
        })
        .token(2, |t| {
            t.value("array_test")
                .scopes(&code(&[Scope::Function, Scope::FunctionName]));
        })
        .token(3, |t| {
            t.value("(")
                .scopes(&code(&[Scope::Function, Scope::ParametersBegin]));
        })
        .token(4, |t| {
            t.value("array").scopes(&param(&[Scope::StorageType]));
        })
        .token(5, |t| {
            t.value(" ").scopes(&param(&[]));
        })
        .token(6, |t| {
            t.value("$")
                .scopes(&param(&[Scope::Variable, Scope::VariablePunctuation]));
        })
        .token(7, |t| {
            t.value("value").scopes(&param(&[Scope::Variable]));
        })
        .token(8, |t| {
            t.value(" ").scopes(&param(&[]));
        })
        .token(9, |t| {
            t.value("=").scopes(&param(&[Scope::AssignmentOperator]));
        })
        .token(10, |t| {
            t.value(" ").scopes(&param(&[]));
        })
        .token(11, |t| {
            t.value("array").scopes(&param(&[Scope::Construct]));
        })
        .token(12, |t| {
            t.value("(").scopes(&param(&[Scope::ArrayBegin]));
        })
        .token(13, |t| {
            t.value(")").scopes(&param(&[Scope::ArrayEnd]));
        })
        .token(14, |t| {
            t.value(")")
                .scopes(&code(&[Scope::Function, Scope::ParametersEnd]));
        })
        .token(15, |t| {
            t.value(" ").scopes(&code(&[Scope::Function]));
        })
        .token(16, |t| {
            t.value("{").scopes(&code(&[Scope::ScopeBegin]));
        })
        .token(17, |t| {
            t.value("}").scopes(&code(&[Scope::ScopeEnd]));
        });
}

#[test]
fn test_array_parameter_with_short_default() {
    let tokens = tokenize("<?hh\nfunction array_test(array $value = []) {}");
    let param = |leaf: &[Scope]| {
        let mut scopes = FUNCTION_ARGS.to_vec();
        scopes.push(Scope::ArgumentShortArray);
        scopes.extend_from_slice(leaf);
        code(&scopes)
    };
    assert_tokens(&tokens[1])
        .count(17)
        .token(4, |t| {
            t.value("array").scopes(&param(&[Scope::StorageType]));
        })
        .token(6, |t| {
            t.value("$")
                .scopes(&param(&[Scope::Variable, Scope::VariablePunctuation]));
        })
        .token(7, |t| {
            t.value("value").scopes(&param(&[Scope::Variable]));
        })
        .token(9, |t| {
            t.value("=").scopes(&param(&[]));
        })
        .token(11, |t| {
            t.value("[").scopes(&param(&[Scope::ShortArrayBegin]));
        })
        .token(12, |t| {
            t.value("]").scopes(&param(&[Scope::ShortArrayEnd]));
        })
        .token(13, |t| {
            t.value(")")
                .scopes(&code(&[Scope::Function, Scope::ParametersEnd]));
        })
        .token(14, |t| {
            t.value(" ").scopes(&code(&[Scope::Function]));
        })
        .token(15, |t| {
            t.value("{").scopes(&code(&[Scope::ScopeBegin]));
        })
        .token(16, |t| {
            t.value("}").scopes(&code(&[Scope::ScopeEnd]));
        });
}

const CLASS_WITH_MAGIC_METHOD: &str = "<?hh
    class TestClass {
      final public function __get(): void {
      }
    }";

const CLASS_WITH_SPLIT_MAGIC_METHOD: &str = "<?hh
    class TestClass {
      final public function __get
        (): void {
      }
    }";

const CLASS_WITHOUT_MAGIC_METHOD: &str = "<?hh
    class TestClass {
      final public function __getSomething(): void {
      }
    }";

#[test]
fn test_magic_method() {
    let tokens = tokenize(CLASS_WITH_MAGIC_METHOD);
    assert_tokens(&tokens[2]).token(7, |t| {
        t.value("__get")
            .scopes(&code(&[Scope::Function, Scope::MagicFunction]));
    });
}

#[test]
fn test_magic_method_with_line_break_after_name() {
    let tokens = tokenize(CLASS_WITH_SPLIT_MAGIC_METHOD);
    assert_tokens(&tokens[2]).token(7, |t| {
        t.value("__get")
            .scopes(&code(&[Scope::Function, Scope::MagicFunction]));
    });
    assert_tokens(&tokens[3]).token(1, |t| {
        t.value("(")
            .scopes(&code(&[Scope::Function, Scope::ParametersBegin]));
    });
}

#[test]
fn test_near_magic_name_is_plain() {
    let tokens = tokenize(CLASS_WITHOUT_MAGIC_METHOD);
    assert_tokens(&tokens[2]).token(7, |t| {
        t.value("__getSomething")
            .scopes(&code(&[Scope::Function, Scope::FunctionName]));
    });
}

#[test]
fn test_closure_use_without_return_type() {
    let tokens = tokenize("<?hh\nfunction() use ($var) {}");
    assert_tokens(&tokens[1])
        .all_have(Scope::Closure)
        .token_with_value("use", |t| {
            t.leaf(Scope::ClosureUse);
        });
}

#[test]
fn test_closure_use_with_return_type() {
    let tokens = tokenize("<?hh\nfunction(): void use ($var) {}");
    assert_tokens(&tokens[1]).token_with_value("use", |t| {
        t.leaf(Scope::ClosureUse);
    });
}

#[test]
fn test_closure_return_type_after_use() {
    let tokens = tokenize("<?hh\nfunction() use ($x): int { return $x; } $y;");
    let line = &tokens[1];
    let end = line.iter().rposition(|t| t.value == "}").unwrap();
    assert_tokens(&line[..=end])
        .all_have(Scope::Closure)
        .token_with_value("use", |t| {
            t.leaf(Scope::ClosureUse);
        })
        .token_with_value("{", |t| {
            t.leaf(Scope::ScopeBegin);
        })
        .token(end, |t| {
            t.leaf(Scope::ScopeEnd);
        });
    assert_tokens(&line[end + 1..]).token_with_value("y", |t| {
        t.lacks(Scope::Closure);
    });
}

#[test]
fn test_closure_stays_open_until_body_on_next_line() {
    let tokens = tokenize("<?hh\nfunction(): void use ($var)\n{}");
    assert_tokens(&tokens[1]).all_have(Scope::Closure);
    assert_tokens(&tokens[2])
        .values(&["{", "}"])
        .all_have(Scope::Closure)
        .token(1, |t| {
            t.leaf(Scope::ScopeEnd);
        });
}

#[test]
fn test_function_type_hint_ends_with_its_group() {
    let tokens = tokenize("<?hh\nnewtype T = (function(): bool); $test = 1;");
    assert_tokens(&tokens[1])
        .token(0, |t| {
            t.value("newtype").leaf(Scope::TypeDeclaration);
        })
        .token_with_value("bool", |t| {
            t.has(Scope::Closure);
        })
        .token_with_value("test", |t| {
            t.lacks(Scope::Closure)
                .scopes(&code(&[Scope::Variable]));
        });
}

#[test]
fn test_markup_around_embedded_block() {
    let tokens = tokenize("<div>\n<?hh echo 1; ?>\n</div>");
    assert_tokens(&tokens[0]).token(0, |t| {
        t.value("<div>").scopes(&[Scope::TextHtmlHack]);
    });
    assert_tokens(&tokens[1])
        .values(&["<?hh", " ", "echo", " ", "1", ";", " ", "?>"])
        .token(0, |t| {
            t.scopes(&[Scope::TextHtmlHack, Scope::EmbeddedBlock, Scope::EmbeddedBegin]);
        })
        .token(2, |t| {
            t.scopes(&code(&[Scope::Construct]));
        })
        .token(7, |t| {
            t.scopes(&[Scope::TextHtmlHack, Scope::EmbeddedBlock, Scope::EmbeddedEnd]);
        });
    assert_tokens(&tokens[2]).token(0, |t| {
        t.value("</div>").scopes(&[Scope::TextHtmlHack]);
    });
}

#[test]
fn test_every_line_reproduces_its_text() {
    let text = "<p>\n<?hh\nfunction f(array $a = [1, 2]): vec<int> {\n  return \"x$y\";\n}\n?>";
    for (line, tokens) in text.split('\n').zip(tokenize(text)) {
        assert_tokens(&tokens).reproduces(line);
    }
}

#[test]
fn test_xhp_literal_lexes_as_operators() {
    let tokens = tokenize("<?hh\n$x = <p>{$y}</p>;\n$z;");
    assert_tokens(&tokens[1])
        .reproduces("$x = <p>{$y}</p>;")
        .token(5, |t| {
            t.value("<").leaf(Scope::ComparisonOperator);
        });
    assert_tokens(&tokens[2]).token(0, |t| {
        t.scopes(&code(&[Scope::VariablePunctuation]));
    });
}
