use std::{
    cell::RefCell,
    io::{self, Cursor, Write},
    rc::Rc,
};

use aurora::{
    AuroraError, ErrorKind, ErrorPolicy, Interpreter, Token,
    ast::{Expr, NodeKind},
    console::Console,
    lexer,
    number::{PromotedFloat, PromotedInt},
    parser::{Evaluator, Parser},
    registry::{CallContext, Class, Keywords},
    token::render,
};

#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).expect("output is utf-8")
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn interpreter_with_input(input: &str) -> (Interpreter, SharedBuffer) {
    let output = SharedBuffer::default();
    let console = Console::new(
        Box::new(output.clone()),
        Box::new(Cursor::new(input.as_bytes().to_vec())),
    );
    (Interpreter::with_console(console), output)
}

fn eval(source: &str) -> Token {
    let (mut interpreter, _) = interpreter_with_input("");
    interpreter
        .run_source(source)
        .expect("evaluation should succeed")
}

fn eval_output(source: &str) -> String {
    let (mut interpreter, output) = interpreter_with_input("");
    interpreter
        .run_source(source)
        .expect("evaluation should succeed");
    output.contents()
}

fn eval_error(source: &str) -> AuroraError {
    let (mut interpreter, _) = interpreter_with_input("");
    match interpreter.run_source(source) {
        Ok(value) => panic!("expected error, received value {}", value.repr()),
        Err(err) => err,
    }
}

fn error_kind(source: &str) -> ErrorKind {
    eval_error(source).kind().expect("error carries a diagnostic")
}

fn strict_policy() -> ErrorPolicy {
    ErrorPolicy {
        strict: true,
        ..ErrorPolicy::default()
    }
}

#[test]
fn evaluates_strictly_left_to_right() {
    assert_eq!(eval("3 + 4 * 2"), Token::int(14));
    assert_eq!(eval("10 - 2 - 3"), Token::int(5));
}

#[test]
fn integer_division_produces_a_float() {
    let value = eval("6 / 3");
    assert!(
        matches!(value, Token::Float(PromotedFloat::Single(v)) if v == 2.0),
        "expected Float(2.0), found {value:?}"
    );
}

#[test]
fn combines_strings() {
    assert_eq!(eval(r#""ab" * 3"#), Token::string("ababab"));
    assert_eq!(eval(r#""a" + "b""#), Token::string("ab"));
}

#[test]
fn big_integer_literals_stay_exact() {
    let value = eval("99999999999999999999999999999999 + 1");
    let expected = PromotedInt::parse("100000000000000000000000000000000").expect("parses");
    assert_eq!(value, Token::Integer(expected));
}

#[test]
fn narrow_overflow_moves_up_the_ladder() {
    match eval("2147483647 + 1") {
        Token::Integer(n) => {
            assert_eq!(n.rank(), "Int64");
            assert_eq!(n.to_string(), "2147483648");
        }
        other => panic!("expected integer, found {other:?}"),
    }
}

#[test]
fn mixed_arithmetic_yields_floats() {
    assert!(matches!(eval("1 + 0.5"), Token::Float(_)));
    assert_eq!(eval("2.5 * 2"), Token::float(5.0f32));
}

#[test]
fn brackets_group_sub_expressions() {
    assert_eq!(eval("(1 + 2) * 3"), Token::int(9));
    assert_eq!(eval("2 * (1 + 2)"), Token::int(6));
    assert_eq!(eval("((4))"), Token::int(4));
}

#[test]
fn operator_errors() {
    assert_eq!(error_kind("1 / 0"), ErrorKind::DivisionByZero);
    assert_eq!(error_kind("1.5 / 0"), ErrorKind::DivisionByZero);
    assert_eq!(error_kind(r#""a" + 1.5"#), ErrorKind::TypeMismatch);
    assert_eq!(error_kind("true + 1"), ErrorKind::TypeMismatch);
    assert_eq!(error_kind(r#""a" + 1"#), ErrorKind::UnsupportedOperation);
    assert_eq!(error_kind(r#""a" - "b""#), ErrorKind::UnsupportedOperation);
    assert_eq!(error_kind("2 ^ 3"), ErrorKind::UnsupportedOperation);
    assert_eq!(error_kind(r#""a" * -1"#), ErrorKind::OutOfRange);
    assert_eq!(error_kind(r#""ab" * 9223372036854775807"#), ErrorKind::OutOfRange);
}

#[test]
fn string_results_respect_the_length_limit() {
    let (interpreter, _) = interpreter_with_input("");
    let mut interpreter = interpreter.with_max_string_length(4);
    assert_eq!(
        interpreter.run_line(r#""ab" * 2"#).expect("at the limit"),
        Token::string("abab")
    );
    for source in [r#""ab" * 3"#, r#""abc" + "de""#] {
        let err = interpreter.run_line(source).expect_err("over the limit");
        assert_eq!(err.kind(), Some(ErrorKind::OutOfRange), "{source}");
    }
}

#[test]
fn terminal_write_prints_each_value() {
    assert_eq!(eval_output(r#"Terminal.write("Hi")"#), "Hi\n");
    assert_eq!(eval_output(r#"Terminal.write("a"; 1; end = "!")"#), "a1!");
}

#[test]
fn registered_method_receives_evaluated_arguments() {
    fn record_call(
        _: &mut CallContext<'_>,
        positionals: &[Token],
        keywords: &Keywords,
    ) -> aurora::diagnostics::Result<Token> {
        Ok(Token::string(format!("{}|{}", render(positionals), keywords.len())))
    }

    let (mut interpreter, _) = interpreter_with_input("");
    interpreter
        .registry_mut()
        .register(Class::new("Terminal").with_method("write", record_call));
    let value = interpreter
        .run_line(r#"Terminal.write("Hi")"#)
        .expect("call succeeds");
    assert_eq!(value, Token::string(r#""Hi"|0"#));
}

#[test]
fn missing_close_bracket_is_unclosed_delimiter() {
    assert_eq!(
        error_kind(r#"Terminal.write("Hi""#),
        ErrorKind::UnclosedDelimiter
    );
}

#[test]
fn keyword_arguments_bind_by_name() {
    let (mut interpreter, output) = interpreter_with_input("Ada\n");
    let value = interpreter
        .run_line(r#"Terminal.read(message = "name? ")"#)
        .expect("read succeeds");
    assert_eq!(value, Token::string("Ada"));
    assert_eq!(output.contents(), "name? ");
}

#[test]
fn keyword_wins_over_positional_with_a_warning() {
    let (mut interpreter, output) = interpreter_with_input("x\n");
    interpreter
        .run_line(r#"Terminal.read("a"; message = "b")"#)
        .expect("surplus is only a warning");
    assert_eq!(output.contents(), "b");

    let (interpreter, _) = interpreter_with_input("x\n");
    let mut interpreter = interpreter.with_policy(strict_policy());
    let err = interpreter
        .run_line(r#"Terminal.read("a"; message = "b")"#)
        .expect_err("strict mode escalates");
    assert_eq!(err.kind(), Some(ErrorKind::ArgumentSurplus));
}

#[test]
fn typed_reads_parse_input() {
    let (mut interpreter, _) = interpreter_with_input("42\n2.5\ntrue\n");
    assert_eq!(
        interpreter.run_line("Terminal.readInt()").expect("int"),
        Token::int(42)
    );
    assert_eq!(
        interpreter.run_line("Terminal.readFloat()").expect("float"),
        Token::float(2.5f32)
    );
    assert_eq!(
        interpreter.run_line("Terminal.readBool()").expect("bool"),
        Token::Boolean(true)
    );
}

#[test]
fn strings_interpolate_variables() {
    let output = eval_output(
        r#"Integer.create(x; 5)
Terminal.write("x is {x}")
Terminal.write("\{x}")"#,
    );
    assert_eq!(output, "x is 5\n{x}\n");
}

#[test]
fn unknown_interpolation_is_left_in_place() {
    assert_eq!(eval_output(r#"Terminal.write("{nope}")"#), "{nope}\n");

    let (interpreter, _) = interpreter_with_input("");
    let mut policy = ErrorPolicy::default();
    policy.escalate.insert("Aurora.VarNotDefined".to_string());
    let mut interpreter = interpreter.with_policy(policy);
    let err = interpreter
        .run_line(r#"Terminal.write("{nope}")"#)
        .expect_err("escalated");
    assert_eq!(err.kind(), Some(ErrorKind::VarNotDefined));
}

#[test]
fn line_number_tracks_the_current_line() {
    let output = eval_output("\nTerminal.write(\"{__LINE_NUMBER__}\")");
    assert_eq!(output, "2\n");

    match eval_error("Terminal.write(\"a\")\n\n1 / 0") {
        AuroraError::Diagnostic(diag) => assert_eq!(diag.line, Some(3)),
        other => panic!("expected diagnostic, found {other}"),
    }
}

#[test]
fn method_results_feed_further_combination() {
    assert_eq!(eval("Integer.create(x; 5) + 1"), Token::int(6));
}

#[test]
fn variables_create_and_edit() {
    assert_eq!(eval("Variables.create(Integer; a; b = 3)\na + b"), Token::int(3));
    assert_eq!(
        eval("Variables.create(String; s)\nVariables.edit(\"s\"; \"hey\")\ns"),
        Token::string("hey")
    );
    assert_eq!(error_kind("Variables.create(Integer)"), ErrorKind::ArgumentDeficit);
    assert_eq!(
        error_kind(r#"Variables.create(Integer; b = "no")"#),
        ErrorKind::TypeMismatch
    );
}

#[test]
fn redeclaring_needs_a_quoted_name() {
    let err = eval_error("Integer.create(x; 7)\nInteger.create(x; 9)");
    assert_eq!(err.kind(), Some(ErrorKind::TypeMismatch));
    match err {
        AuroraError::Diagnostic(diag) => assert_eq!(diag.notes.len(), 1),
        other => panic!("expected diagnostic, found {other}"),
    }

    let source = "Integer.create(x; 7)\nInteger.create(\"x\"; 9)";
    assert_eq!(eval(&format!("{source}\n7")), Token::int(7));
    assert_eq!(eval(&format!("{source}\nx")), Token::int(9));
}

#[test]
fn only_words_name_variables() {
    assert_eq!(eval("String.create(\"5\"; \"five\")\n5"), Token::int(5));
    assert_eq!(eval("Integer.create(x; 1)\n\"x\""), Token::string("x"));
}

#[test]
fn system_variables_are_read_only() {
    assert_eq!(
        error_kind(r#"Variables.edit("__CWD__"; 1)"#),
        ErrorKind::ImmutableVarModification
    );
}

#[test]
fn typed_factories_store_defaults() {
    assert_eq!(eval("Float.create(f)\nf"), Token::float(0.0f32));
    assert_eq!(eval("Float.create(g; 2)\ng"), Token::float(2.0f32));
    assert_eq!(eval("String.create(s)\ns"), Token::string(""));
    assert_eq!(error_kind("Integer.create()"), ErrorKind::ArgumentDeficit);
}

#[test]
fn boolean_styles() {
    assert_eq!(
        eval("Boolean.create(flag; true)\nBoolean.toStyle(flag; \"char\")"),
        Token::string("y")
    );
    assert_eq!(
        eval("Boolean.create(flag; false)\nBoolean.toStyle(flag; \"number\")"),
        Token::string("2")
    );
    assert_eq!(
        error_kind("Boolean.create(flag; true)\nBoolean.toStyle(flag; \"emoji\")"),
        ErrorKind::UnsupportedOperation
    );
}

#[test]
fn colors_build_escape_sequences() {
    assert_eq!(eval("Colors.RED"), Token::string("\x1b[31m"));
    assert_eq!(
        eval("Colors.rgb(255; 0; 0)"),
        Token::string("\x1b[38;2;255;0;0m")
    );
    assert_eq!(
        eval(r##"Colors.hex("#00ff00"; background = true)"##),
        Token::string("\x1b[48;2;0;255;0m")
    );
    assert_eq!(error_kind("Colors.rgb(300; 0; 0)"), ErrorKind::OutOfRange);
    assert_eq!(error_kind(r#"Colors.hex("00ff00")"#), ErrorKind::InvalidSyntax);
}

#[test]
fn unknown_members_are_reported() {
    assert_eq!(error_kind("Nope.thing"), ErrorKind::ModuleNotFound);
    assert_eq!(error_kind("Terminal.nope()"), ErrorKind::InvalidMethod);
    assert_eq!(error_kind("Terminal.nope"), ErrorKind::InvalidAttribute);
}

#[test]
fn class_names_evaluate_to_placeholders() {
    assert_eq!(eval("Terminal"), Token::string("CLASS<Terminal>"));
}

#[test]
fn quoted_class_names_are_plain_strings() {
    assert_eq!(eval(r#""Terminal""#), Token::string("Terminal"));
    assert_eq!(error_kind(r#""Terminal".color"#), ErrorKind::ModuleNotFound);
}

#[test]
fn nesting_past_the_limit_is_rejected() {
    let (interpreter, _) = interpreter_with_input("");
    let mut interpreter = interpreter.with_max_depth(2);
    let err = interpreter.run_line("((1))").expect_err("too deep");
    assert_eq!(err.kind(), Some(ErrorKind::ExpressionDepthExceeded));
    assert_eq!(interpreter.run_line("(1)").expect("within limit"), Token::int(1));
}

#[test]
fn node_kind_is_a_pure_function_of_state() {
    let (mut interpreter, _) = interpreter_with_input("");
    let cases = [
        ("", NodeKind::Empty),
        ("5", NodeKind::Literal),
        ("Terminal.", NodeKind::ClassReference),
        ("Terminal.color", NodeKind::AttributeAccess),
        (r#"Terminal.write("Hi")"#, NodeKind::MethodCall),
    ];
    for (source, expected) in cases {
        let tokens = lexer::tokenize(source).expect("tokenizes");
        let expr = Parser::new(&mut interpreter).build(&tokens).expect("builds");
        let first = expr.kind();
        assert_eq!(first, expected, "kind of {source:?}");
        assert_eq!(expr.kind(), first);
        assert_eq!(expr.clone().kind(), first);
    }
}

#[test]
fn arguments_evaluate_to_one_or_two_tokens() {
    let (mut interpreter, _) = interpreter_with_input("");
    let positional = Expr::literal(Token::int(1));
    assert_eq!(
        interpreter.evaluate_argument(&positional).expect("evaluates"),
        vec![Token::int(1)]
    );

    let keyword = Expr {
        keyword: Some("end".to_string()),
        ..Expr::literal(Token::string("!"))
    };
    assert_eq!(
        interpreter.evaluate_argument(&keyword).expect("evaluates"),
        vec![Token::word("end"), Token::string("!")]
    );
    assert_eq!(interpreter.evaluate(&Expr::new()).expect("empty"), Token::Null);
}
