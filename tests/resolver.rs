#[cfg(test)]
mod resolver_tests {
    use roxide as lox;

    use lox::parser::{ExprId, Parser};
    use lox::resolver::{Bindings, Resolver};
    use lox::scanner::scan_tokens;

    /// Resolve `source`, returning the distance table and rendered
    /// diagnostics.
    fn resolve_source(source: &str) -> (Bindings, Vec<String>) {
        let (tokens, lex_errors) = scan_tokens(source.as_bytes());
        assert!(lex_errors.is_empty(), "lex errors: {:?}", lex_errors);

        let mut parser = Parser::new(&tokens);
        let (statements, parse_errors) = parser.parse();
        assert!(parse_errors.is_empty(), "parse errors: {:?}", parse_errors);

        let (bindings, errors) = Resolver::new().resolve(&statements);

        (bindings, errors.iter().map(ToString::to_string).collect())
    }

    #[test]
    fn test_resolver_01_top_level_binds_to_the_global_scope() {
        let (bindings, errors) = resolve_source("var a = 1; print a; a = 2;");

        assert!(errors.is_empty());
        // Ids issue in parse order: the read is 0.  Rewriting `a = 2` into
        // an assignment drops the id issued to its left-hand variable (1);
        // the assignment node itself carries 2 and holds the distance.
        assert_eq!(bindings.get(&ExprId(0)), Some(&0));
        assert_eq!(bindings.get(&ExprId(1)), None);
        assert_eq!(bindings.get(&ExprId(2)), Some(&0));
    }

    #[test]
    fn test_resolver_02_undeclared_names_stay_unrecorded() {
        let (bindings, errors) = resolve_source("print zzz;");

        assert!(errors.is_empty());
        assert!(bindings.is_empty(), "unknown names resolve dynamically");
    }

    #[test]
    fn test_resolver_03_distances_count_enclosing_scopes() {
        let source = "\
{
    var a = 1;
    {
        print a;
    }
    print a;
}";
        let (bindings, errors) = resolve_source(source);

        assert!(errors.is_empty());
        // First read sits one block below the declaration, second sits
        // in the declaring block itself.
        assert_eq!(bindings.get(&ExprId(0)), Some(&1));
        assert_eq!(bindings.get(&ExprId(1)), Some(&0));
    }

    #[test]
    fn test_resolver_04_shadowing_resolves_to_nearest() {
        let source = "\
{
    var a = 1;
    {
        var a = 2;
        print a;
    }
}";
        let (bindings, errors) = resolve_source(source);

        assert!(errors.is_empty());
        assert_eq!(bindings.get(&ExprId(0)), Some(&0));
    }

    #[test]
    fn test_resolver_05_initializer_reads_enclosing_declaration() {
        let source = "\
var a = 1;
{
    var a = a + 1;
    print a;
}
print a;";
        let (bindings, errors) = resolve_source(source);

        assert!(errors.is_empty(), "errors: {:?}", errors);
        // The initializer's read skips the declaration in flight and
        // lands on the outer `a`; both prints see their own scope.
        assert_eq!(bindings.get(&ExprId(0)), Some(&1));
        assert_eq!(bindings.get(&ExprId(1)), Some(&0));
        assert_eq!(bindings.get(&ExprId(2)), Some(&0));
    }

    #[test]
    fn test_resolver_06_own_initializer_without_outer_rejected() {
        let (_, block_errors) = resolve_source("{ var a = a; }");
        assert_eq!(block_errors.len(), 1);
        assert!(block_errors[0].contains("Cannot read local variable in its own initializer"));

        let (_, top_errors) = resolve_source("var a = a;");
        assert_eq!(top_errors.len(), 1);
        assert!(top_errors[0].contains("Cannot read local variable in its own initializer"));
    }

    #[test]
    fn test_resolver_07_duplicate_declaration_rejected() {
        let (_, errors) = resolve_source("{ var a = 1; var a = 2; }");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Variable already declared in this scope"));
    }

    #[test]
    fn test_resolver_08_return_outside_function() {
        let (_, errors) = resolve_source("return 1;");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("'return' used outside of function"));
    }

    #[test]
    fn test_resolver_09_this_outside_class() {
        let (_, errors) = resolve_source("print this;");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Cannot use 'this' outside of a class"));
    }

    #[test]
    fn test_resolver_10_super_outside_class() {
        let (_, errors) = resolve_source("print super.method;");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Cannot use 'super' outside of a class"));
    }

    #[test]
    fn test_resolver_11_super_without_superclass() {
        let (_, errors) = resolve_source("class A { m() { return super.m(); } }");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Cannot use 'super' in a class with no superclass"));
    }

    #[test]
    fn test_resolver_12_self_inheritance_rejected() {
        let (_, errors) = resolve_source("class A < A {}");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("A class cannot inherit from itself"));
    }

    #[test]
    fn test_resolver_13_method_this_binds_one_frame_up() {
        // The `this` inside m is the only id-bearing node, so it gets
        // id 0; it crosses the method's parameter scope to reach the
        // implicit class scope.
        let (bindings, errors) = resolve_source("class C { m() { return this; } }");

        assert!(errors.is_empty());
        assert_eq!(bindings.get(&ExprId(0)), Some(&1));
    }

    #[test]
    fn test_resolver_14_super_binds_alongside_this() {
        // Ids in parse order: 0 is the superclass reference (found in
        // the global scope), 1 is the `super` expression.
        let (bindings, errors) =
            resolve_source("class A {} class B < A { m() { return super.m(); } }");

        assert!(errors.is_empty());
        assert_eq!(bindings.get(&ExprId(0)), Some(&0));
        assert_eq!(bindings.get(&ExprId(1)), Some(&1));
    }

    #[test]
    fn test_resolver_15_closure_reaches_enclosing_function_scope() {
        let source = "\
fun outer() {
    var x = 1;
    fun inner() {
        return x;
    }
    return inner;
}";
        let (bindings, errors) = resolve_source(source);

        assert!(errors.is_empty());
        // `x` inside inner crosses inner's parameter scope; `inner`
        // itself is read in outer's own scope.
        assert_eq!(bindings.get(&ExprId(0)), Some(&1));
        assert_eq!(bindings.get(&ExprId(1)), Some(&0));
    }

    #[test]
    fn test_resolver_16_static_method_sees_this() {
        // A static method runs with the class object as its receiver,
        // so `this` still resolves.
        let (bindings, errors) =
            resolve_source("class C { static describe() { return this; } }");

        assert!(errors.is_empty());
        assert_eq!(bindings.get(&ExprId(0)), Some(&1));
    }
}
