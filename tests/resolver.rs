#[cfg(test)]
mod resolver_tests {
    use std::collections::HashMap;

    use loxide as lox;

    use lox::error::LoxError;
    use lox::parser::Parser;
    use lox::resolver::Resolver;
    use lox::scanner::Scanner;
    use lox::token::Token;

    fn resolve_source(source: &str) -> (HashMap<usize, usize>, Vec<LoxError>) {
        let tokens: Vec<Token> = Scanner::new(source.as_bytes())
            .filter_map(Result::ok)
            .collect();

        let (statements, parse_errors) = Parser::new(tokens, 0).parse();
        assert!(
            parse_errors.is_empty(),
            "unexpected parse errors: {:?}",
            parse_errors
        );

        Resolver::new().resolve(&statements)
    }

    fn resolve_errors(source: &str) -> Vec<String> {
        let (_, errors) = resolve_source(source);
        errors.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_globals_get_no_entries() {
        let (locals, errors) = resolve_source("var a = 1; print a; a = 2;");

        assert!(errors.is_empty());
        assert!(locals.is_empty(), "globals must stay out of the map");
    }

    #[test]
    fn test_block_local_depth_zero() {
        let (locals, errors) = resolve_source("{ var a = 1; print a; }");

        assert!(errors.is_empty());
        assert_eq!(locals.len(), 1);
        assert_eq!(locals.values().copied().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_nested_block_depth_counts_frames() {
        let (locals, errors) = resolve_source("{ var a = 1; { { print a; } } }");

        assert!(errors.is_empty());
        assert_eq!(locals.len(), 1);
        assert_eq!(locals.values().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_closure_capture_depth() {
        // Inside c's body: scopes are [mk-body, c-body]; i lives in mk-body.
        let (locals, errors) = resolve_source(
            "fun mk() { var i = 0; fun c() { i = i + 1; return i; } return c; }",
        );

        assert!(errors.is_empty());
        // Three occurrences of i inside c (assign target, read, return read)
        // sit one frame up; `return c` finds c in mk's own frame at depth 0.
        let mut depths: Vec<usize> = locals.values().copied().collect();
        depths.sort_unstable();
        assert_eq!(depths, vec![0, 1, 1, 1]);
    }

    #[test]
    fn test_shadowing_resolves_to_nearest() {
        let (locals, errors) = resolve_source("{ var a = 1; { var a = 2; print a; } }");

        assert!(errors.is_empty());
        // Both `a` declarations are locals; the print resolves to the inner
        // one at depth 0.
        assert_eq!(locals.len(), 1);
        assert_eq!(locals.values().copied().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_return_at_top_level_is_error() {
        let errors = resolve_errors("return 1;");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Can't return from top-level code."));
    }

    #[test]
    fn test_return_value_in_initializer_is_error() {
        let errors = resolve_errors("class A { init() { return 1; } }");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Can't return a value from an initializer."));
    }

    #[test]
    fn test_bare_return_in_initializer_is_allowed() {
        let errors = resolve_errors("class A { init() { return; } }");

        assert!(errors.is_empty(), "errors: {:?}", errors);
    }

    #[test]
    fn test_this_outside_class_is_error() {
        let errors = resolve_errors("print this;");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Can't use 'this' outside of a class."));
    }

    #[test]
    fn test_this_in_plain_function_is_error() {
        let errors = resolve_errors("fun f() { return this; }");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Can't use 'this' outside of a class."));
    }

    #[test]
    fn test_super_outside_class_is_error() {
        let errors = resolve_errors("print super.m;");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Can't use 'super' outside of a class."));
    }

    #[test]
    fn test_super_without_superclass_is_error() {
        let errors = resolve_errors("class A { m() { return super.m; } }");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Can't use 'super' in a class with no superclass."));
    }

    #[test]
    fn test_self_inheritance_is_error() {
        let errors = resolve_errors("class A < A { }");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("A class can't inherit from itself."));
    }

    #[test]
    fn test_read_in_own_initializer_is_error() {
        let errors = resolve_errors("{ var a = a; }");

        assert!(
            errors
                .iter()
                .any(|e| e.contains("Can't read local variable in its own initializer.")),
            "errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_duplicate_local_declaration_is_error() {
        let errors = resolve_errors("fun f() { var a = 1; var a = 2; }");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Already a variable with this name in this scope."));
    }

    #[test]
    fn test_global_redeclaration_is_allowed() {
        let errors = resolve_errors("var a = 1; var a = 2;");

        assert!(errors.is_empty(), "errors: {:?}", errors);
    }

    #[test]
    fn test_errors_accumulate_instead_of_stopping() {
        let errors = resolve_errors("return 1; print this; print super.m;");

        assert_eq!(errors.len(), 3, "errors: {:?}", errors);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let source = "{ var a = 1; fun f(b) { return a + b; } }";

        let first = resolve_source(source).0;
        let second = resolve_source(source).0;

        assert_eq!(first, second, "map must be a function of the AST alone");
    }
}
