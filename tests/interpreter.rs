#[cfg(test)]
mod interpreter_tests {
    use roxide as lox;

    use std::cell::RefCell;
    use std::io::Write;
    use std::rc::Rc;

    use lox::error::LoxError;
    use lox::interpreter::Interpreter;
    use lox::parser::Parser;
    use lox::resolver::Resolver;
    use lox::scanner::scan_tokens;
    use lox::value::Value;

    /// Cloneable byte sink so tests can hand the interpreter an output
    /// handle and still read what it wrote afterwards.
    #[derive(Clone, Default)]
    struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Run a program through the full pipeline, returning what it printed
    /// or the runtime fault it stopped on.
    fn try_run(source: &str) -> Result<String, String> {
        let (tokens, lex_errors) = scan_tokens(source.as_bytes());
        assert!(lex_errors.is_empty(), "lex errors: {:?}", lex_errors);

        let mut parser = Parser::new(&tokens);
        let (statements, parse_errors) = parser.parse();
        assert!(parse_errors.is_empty(), "parse errors: {:?}", parse_errors);

        let (bindings, resolve_errors) = Resolver::new().resolve(&statements);
        assert!(resolve_errors.is_empty(), "resolve errors: {:?}", resolve_errors);

        let sink = SharedBuf::default();
        let mut interpreter = Interpreter::with_output(Box::new(sink.clone()));

        match interpreter.interpret(&statements, bindings) {
            Ok(()) => Ok(sink.contents()),
            Err(e) => Err(e.to_string()),
        }
    }

    /// Run a program expected to succeed.
    fn run(source: &str) -> String {
        match try_run(source) {
            Ok(output) => output,
            Err(e) => panic!("program failed: {e}\nsource:\n{source}"),
        }
    }

    /// Run a program expected to fault, returning the rendered error.
    fn fault(source: &str) -> String {
        match try_run(source) {
            Ok(output) => panic!("program did not fault\noutput: {output:?}\nsource:\n{source}"),
            Err(e) => e,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Expressions
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn test_interpreter_01_arithmetic_and_number_display() {
        let output = run("print 1 + 2 * 3; print 7 / 2; print -(4 - 6);");

        assert_eq!(output, "7\n3.5\n2\n");
    }

    #[test]
    fn test_interpreter_02_string_concat_accepts_one_string() {
        let output = run(r#"print "n=" + 3; print 4 + "=n"; print "a" + "b";"#);

        assert_eq!(output, "n=3\n4=n\nab\n");
    }

    #[test]
    fn test_interpreter_03_plus_without_any_string_faults() {
        let message = fault("print true + 1;");

        assert!(message.contains("Operands must be numbers or one of them must be a string"));
    }

    #[test]
    fn test_interpreter_04_division_by_zero_faults() {
        assert!(fault("print 1 / 0;").contains("Division by zero."));
    }

    #[test]
    fn test_interpreter_05_comparison_needs_numbers() {
        assert!(fault(r#"print 1 < "two";"#).contains("Operands must be numbers."));
        assert!(fault(r#"print -"x";"#).contains("Operand must be a number."));
    }

    #[test]
    fn test_interpreter_06_truthiness_only_nil_and_false() {
        let output = run("print nil ? 1 : 2; print 0 ? 1 : 2; print \"\" ? 1 : 2;");

        assert_eq!(output, "2\n1\n1\n");
    }

    #[test]
    fn test_interpreter_07_nil_compares_unequal_to_everything() {
        let output = run("print nil == nil; print nil != nil; print nil == false;");

        assert_eq!(output, "false\ntrue\nfalse\n");
    }

    #[test]
    fn test_interpreter_08_comma_keeps_right_after_left_effects() {
        let output = run("var a = 1; var b = (a = 2, a + 1); print a; print b;");

        assert_eq!(output, "2\n3\n");
    }

    #[test]
    fn test_interpreter_09_logical_operators_short_circuit() {
        let source = "\
var called = 0;
fun touch() {
    called = called + 1;
    return true;
}
var ignored = false and touch();
print called;
print false or 7;
print 1 and 2;";
        let output = run(source);

        assert_eq!(output, "0\n7\n2\n");
    }

    #[test]
    fn test_interpreter_10_evaluate_expression_yields_value() {
        let (tokens, lex_errors) = scan_tokens(b"(2 + 3) * 4");
        assert!(lex_errors.is_empty());

        let mut parser = Parser::new(&tokens);
        let expr = parser.parse_expression().unwrap();

        let mut interpreter = Interpreter::new();
        let value = interpreter.evaluate_expression(&expr).unwrap();

        assert_eq!(value, Value::Number(20.0));
    }

    // ─────────────────────────────────────────────────────────────────────
    // Variables and scopes
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn test_interpreter_11_declared_but_unassigned_read_faults() {
        assert!(fault("var a; print a;").contains("Use of unassigned variable 'a'."));
        assert!(fault("{ var a; print a; }").contains("Use of unassigned variable 'a'."));
    }

    #[test]
    fn test_interpreter_12_assignment_clears_unassigned_state() {
        let output = run("var a; a = 5; print a;");

        assert_eq!(output, "5\n");
    }

    #[test]
    fn test_interpreter_13_undefined_variable_faults() {
        assert!(fault("print missing;").contains("Undefined variable 'missing'."));
    }

    #[test]
    fn test_interpreter_14_blocks_shadow_and_restore() {
        let source = "\
var a = 1;
{
    var a = 2;
    print a;
}
print a;";
        assert_eq!(run(source), "2\n1\n");

        // A shadowing initializer reads the declaration it shadows.
        let source = "\
var a = 1;
{
    var a = a + 1;
    print a;
}
print a;";
        assert_eq!(run(source), "2\n1\n");
    }

    #[test]
    fn test_interpreter_15_reads_use_resolved_scope_not_latest() {
        // The function body resolved `a` to the global before the block
        // declared its own; both calls must agree.
        let source = "\
var a = \"global\";
{
    fun show() {
        print a;
    }
    show();
    var a = \"block\";
    show();
}";
        assert_eq!(run(source), "global\nglobal\n");
    }

    // ─────────────────────────────────────────────────────────────────────
    // Functions and closures
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn test_interpreter_16_closures_share_the_captured_frame() {
        let source = "\
fun makeCounter(start) {
    var count = start;
    fun increment() {
        count = count + 1;
        return count;
    }
    return increment;
}
var counter = makeCounter(5);
print counter();
print counter();";
        assert_eq!(run(source), "6\n7\n");

        // Two functions built in the same call observe each other's
        // writes to the shared variable.
        let source = "\
var bump;
var read;
fun make(start) {
    var value = start;
    fun up() {
        value = value + 1;
        return value;
    }
    fun peek() {
        return value;
    }
    bump = up;
    read = peek;
}
make(10);
print bump();
print read();
print bump();";
        assert_eq!(run(source), "11\n11\n12\n");
    }

    #[test]
    fn test_interpreter_17_return_unwinds_through_loops() {
        let source = "\
fun firstOver(limit) {
    var n = 0;
    while (true) {
        if (n > limit) {
            return n;
        }
        n = n + 3;
    }
}
print firstOver(10);";
        assert_eq!(run(source), "12\n");
    }

    #[test]
    fn test_interpreter_18_recursion_and_bare_return() {
        let source = "\
fun fib(n) {
    if (n < 2) return n;
    return fib(n - 2) + fib(n - 1);
}
fun noisy() {
    return;
}
print fib(10);
print noisy();";
        assert_eq!(run(source), "55\nnil\n");
    }

    #[test]
    fn test_interpreter_19_arity_mismatch_names_both_counts() {
        assert!(fault("fun f(a, b) { return a + b; } f(1);")
            .contains("Expected 2 arguments but got 1."));
    }

    #[test]
    fn test_interpreter_20_calling_a_non_callable_faults() {
        assert!(fault("var x = 1; x();").contains("Can only call functions and classes."));
    }

    #[test]
    fn test_interpreter_21_for_loop_desugars_and_runs() {
        let source = "\
var sum = 0;
for (var i = 1; i <= 4; i = i + 1) {
    sum = sum + i;
}
print sum;";
        assert_eq!(run(source), "10\n");
    }

    #[test]
    fn test_interpreter_22_clock_native_callable_and_self_equal() {
        assert_eq!(run("print clock() >= 0;"), "true\n");

        // Two reads of the one native definition compare equal.
        assert_eq!(run("print clock == clock;"), "true\n");
    }

    // ─────────────────────────────────────────────────────────────────────
    // Classes
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn test_interpreter_23_fields_and_methods_through_this() {
        let source = "\
class Greeter {
    init(name) {
        this.name = name;
    }
    greet() {
        return \"hi \" + this.name;
    }
}
print Greeter(\"sam\").greet();";
        assert_eq!(run(source), "hi sam\n");

        // State written through one method call is visible to the next.
        let source = "\
class Counter {
    init(n) {
        this.n = n;
    }
    inc() {
        this.n = this.n + 1;
        return this.n;
    }
}
var c = Counter(5);
print c.inc();
print c.inc();";
        assert_eq!(run(source), "6\n7\n");
    }

    #[test]
    fn test_interpreter_24_methods_bind_their_receiver() {
        let source = "\
class Cake {
    flavor() {
        return this.kind;
    }
}
var cake = Cake();
cake.kind = \"chocolate\";
var detached = cake.flavor;
print detached();";
        assert_eq!(run(source), "chocolate\n");
    }

    #[test]
    fn test_interpreter_25_init_always_returns_the_receiver() {
        let source = "\
class Thing {
    init() {
        this.ready = true;
        return;
    }
}
var t = Thing();
print t.ready;
print t.init() == t;";
        assert_eq!(run(source), "true\ntrue\n");
    }

    #[test]
    fn test_interpreter_26_inheritance_and_super_dispatch() {
        let source = "\
class A {
    speak() {
        return \"A\";
    }
}
class B < A {
    speak() {
        return super.speak() + \"B\";
    }
}
print B().speak();";
        assert_eq!(run(source), "AB\n");
    }

    #[test]
    fn test_interpreter_27_super_binds_to_the_defining_class() {
        // `super` inside BostonCream must reach Doughnut even when the
        // receiver is a further subclass.
        let source = "\
class Doughnut {
    cook() {
        return \"fry\";
    }
}
class BostonCream < Doughnut {
    cook() {
        return super.cook() + \" then fill\";
    }
}
class Special < BostonCream {}
print Special().cook();";
        assert_eq!(run(source), "fry then fill\n");
    }

    #[test]
    fn test_interpreter_28_superclass_expression_must_be_a_class() {
        assert!(fault("var NotAClass = 1; class Sub < NotAClass {}")
            .contains("Superclass must be a class."));
    }

    #[test]
    fn test_interpreter_29_static_methods_live_on_the_class() {
        let source = "\
class Math {
    static square(n) {
        return n * n;
    }
}
print Math.square(3);";
        assert_eq!(run(source), "9\n");
    }

    #[test]
    fn test_interpreter_30_static_methods_inherit_through_metaclasses() {
        let source = "\
class Math {
    static square(n) {
        return n * n;
    }
}
class Advanced < Math {}
print Advanced.square(4);";
        assert_eq!(run(source), "16\n");
    }

    #[test]
    fn test_interpreter_31_getters_run_on_property_access() {
        let source = "\
class Circle {
    init(radius) {
        this.radius = radius;
    }
    area {
        return 3 * this.radius * this.radius;
    }
}
var c = Circle(2);
print c.area;";
        assert_eq!(run(source), "12\n");
    }

    #[test]
    fn test_interpreter_32_class_objects_accept_fields() {
        let source = "\
class Config {}
Config.version = 3;
print Config.version;";
        assert_eq!(run(source), "3\n");
    }

    #[test]
    fn test_interpreter_33_property_access_on_primitives_faults() {
        assert!(fault("var x = 1; print x.y;").contains("Only instances have properties."));
        assert!(fault("var x = 1; x.y = 2;").contains("Only instances have fields."));
    }

    #[test]
    fn test_interpreter_34_unknown_property_faults() {
        assert!(fault("class A {} print A().nope;").contains("Undefined property 'nope'."));
    }

    #[test]
    fn test_interpreter_35_inherited_init_constructs_subclasses() {
        let source = "\
class A {
    init(n) {
        this.n = n;
    }
}
class B < A {}
var b = B(7);
print b.n;";
        assert_eq!(run(source), "7\n");

        // The subclass's arity comes from the inherited init as well.
        assert!(fault("class A { init(n) { this.n = n; } } class B < A {} B();")
            .contains("Expected 1 arguments but got 0."));
    }

    #[test]
    fn test_interpreter_36_fields_shadow_methods_on_lookup() {
        let source = "\
class Speaker {
    describe() {
        return \"spoken\";
    }
}
var s = Speaker();
print s.describe();
s.describe = \"written\";
print s.describe;";
        assert_eq!(run(source), "spoken\nwritten\n");
    }

    // ─────────────────────────────────────────────────────────────────────
    // Session behavior
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn test_interpreter_37_sequential_chunks_share_state() {
        let (first_tokens, _) = scan_tokens(b"var a = 1;");
        let (second_tokens, _) = scan_tokens(b"print a;");

        let mut first_parser = Parser::new(&first_tokens);
        let (first_statements, first_errors) = first_parser.parse();
        assert!(first_errors.is_empty());

        let mut second_parser = Parser::resuming(&second_tokens, first_parser.ids_issued());
        let (second_statements, second_errors) = second_parser.parse();
        assert!(second_errors.is_empty());

        let sink = SharedBuf::default();
        let mut interpreter = Interpreter::with_output(Box::new(sink.clone()));

        let (first_bindings, _) = Resolver::new().resolve(&first_statements);
        interpreter.interpret(&first_statements, first_bindings).unwrap();

        let (second_bindings, _) = Resolver::new().resolve(&second_statements);
        interpreter
            .interpret(&second_statements, second_bindings)
            .unwrap();

        assert_eq!(sink.contents(), "1\n");
    }

    #[test]
    fn test_interpreter_38_fault_keeps_earlier_effects() {
        let (first_tokens, _) = scan_tokens(b"var a = 1; print missing;");
        let (second_tokens, _) = scan_tokens(b"print a;");

        let mut first_parser = Parser::new(&first_tokens);
        let (first_statements, _) = first_parser.parse();

        let mut second_parser = Parser::resuming(&second_tokens, first_parser.ids_issued());
        let (second_statements, _) = second_parser.parse();

        let sink = SharedBuf::default();
        let mut interpreter = Interpreter::with_output(Box::new(sink.clone()));

        let (first_bindings, _) = Resolver::new().resolve(&first_statements);
        let outcome = interpreter.interpret(&first_statements, first_bindings);
        assert!(outcome.is_err());

        let (second_bindings, _) = Resolver::new().resolve(&second_statements);
        interpreter
            .interpret(&second_statements, second_bindings)
            .unwrap();

        assert_eq!(sink.contents(), "1\n");
    }

    #[test]
    fn test_interpreter_39_runtime_fault_reports_line_and_lexeme() {
        let message = fault("var x = 1;\nprint -\"x\";");

        assert!(message.contains("[line 2]"), "got: {message}");

        // The structured record also carries the offending lexeme, even
        // though the rendered form shows only message and line.
        let (tokens, _) = scan_tokens(b"print -\"x\";");
        let mut parser = Parser::new(&tokens);
        let (statements, _) = parser.parse();
        let (bindings, _) = Resolver::new().resolve(&statements);

        let sink = SharedBuf::default();
        let mut interpreter = Interpreter::with_output(Box::new(sink.clone()));
        let err = interpreter.interpret(&statements, bindings).unwrap_err();

        match err {
            LoxError::Runtime { lexeme, line, .. } => {
                assert_eq!(lexeme, "-");
                assert_eq!(line, 1);
            }
            other => panic!("expected a runtime fault, got {other:?}"),
        }
    }
}
