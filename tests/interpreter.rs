#[cfg(test)]
mod interpreter_tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use loxide as lox;

    use lox::error::LoxError;
    use lox::interpreter::Interpreter;
    use lox::parser::Parser;
    use lox::resolver::Resolver;
    use lox::scanner::Scanner;
    use lox::token::Token;

    /// Run a program through the whole pipeline and capture what `print`
    /// wrote.  Panics on static errors; runtime errors come back as `Err`.
    fn run(source: &str) -> Result<String, LoxError> {
        let tokens: Vec<Token> = Scanner::new(source.as_bytes())
            .filter_map(Result::ok)
            .collect();

        let (statements, parse_errors) = Parser::new(tokens, 0).parse();
        assert!(
            parse_errors.is_empty(),
            "unexpected parse errors: {:?}",
            parse_errors
        );

        let (locals, resolve_errors) = Resolver::new().resolve(&statements);
        assert!(
            resolve_errors.is_empty(),
            "unexpected resolve errors: {:?}",
            resolve_errors
        );

        let output = Rc::new(RefCell::new(Vec::new()));
        let mut interpreter = Interpreter::with_output(output.clone());
        interpreter.add_locals(locals);

        interpreter.interpret(&statements)?;

        let bytes = output.borrow().clone();
        Ok(String::from_utf8(bytes).expect("print output should be UTF-8"))
    }

    fn run_ok(source: &str) -> String {
        match run(source) {
            Ok(output) => output,
            Err(e) => panic!("program failed: {}", e),
        }
    }

    fn run_err(source: &str) -> String {
        match run(source) {
            Ok(output) => panic!("program should have failed, printed: {:?}", output),
            Err(e) => e.to_string(),
        }
    }

    // ── arithmetic & printing ───────────────────────────────────────────

    #[test]
    fn test_arithmetic() {
        assert_eq!(run_ok("print 1 + 2;"), "3\n");
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(run_ok("var a = \"hi\"; print a + \" there\";"), "hi there\n");
    }

    #[test]
    fn test_number_stringification() {
        assert_eq!(run_ok("print 2.5;"), "2.5\n");
        assert_eq!(run_ok("print 4 - 1;"), "3\n");
        assert_eq!(run_ok("print 10 / 4;"), "2.5\n");
        assert_eq!(run_ok("print -0.5;"), "-0.5\n");
    }

    #[test]
    fn test_nil_and_booleans_print() {
        assert_eq!(run_ok("print nil; print true; print false;"), "nil\ntrue\nfalse\n");
    }

    #[test]
    fn test_division_by_zero_is_infinity() {
        assert_eq!(run_ok("print 1 / 0;"), "inf\n");
    }

    #[test]
    fn test_grouping_preserves_value() {
        assert_eq!(run_ok("print (1 + 2) * 2; print (nil);"), "6\nnil\n");
    }

    // ── equality & truthiness ───────────────────────────────────────────

    #[test]
    fn test_equality_rules() {
        assert_eq!(run_ok("print nil == nil;"), "true\n");
        assert_eq!(run_ok("print nil == false;"), "false\n");
        assert_eq!(run_ok("print 1 == 1;"), "true\n");
        assert_eq!(run_ok("print \"a\" == \"a\";"), "true\n");
        assert_eq!(run_ok("print 1 == \"1\";"), "false\n");
        assert_eq!(run_ok("print true != false;"), "true\n");
    }

    #[test]
    fn test_zero_and_empty_string_are_truthy() {
        assert_eq!(run_ok("if (0) print \"yes\"; else print \"no\";"), "yes\n");
        assert_eq!(run_ok("if (\"\") print \"yes\"; else print \"no\";"), "yes\n");
    }

    #[test]
    fn test_double_negation_is_truthiness() {
        assert_eq!(run_ok("print !!0;"), "true\n");
        assert_eq!(run_ok("print !!nil;"), "false\n");
        assert_eq!(run_ok("print !!\"\";"), "true\n");
    }

    // ── logical operators ───────────────────────────────────────────────

    #[test]
    fn test_logical_operators_return_operand() {
        assert_eq!(run_ok("print nil or \"x\";"), "x\n");
        assert_eq!(run_ok("print 1 and 2;"), "2\n");
        assert_eq!(run_ok("print false and 2;"), "false\n");
        assert_eq!(run_ok("print 1 or 2;"), "1\n");
    }

    #[test]
    fn test_logical_short_circuit_skips_side_effects() {
        assert_eq!(
            run_ok("fun boom() { print \"boom\"; return true; } print true or boom();"),
            "true\n"
        );
        assert_eq!(
            run_ok("fun boom() { print \"boom\"; return true; } print false and boom();"),
            "false\n"
        );
    }

    // ── variables, scopes, blocks ───────────────────────────────────────

    #[test]
    fn test_assignment_is_an_expression() {
        assert_eq!(run_ok("var a = 1; print a = 2; print a;"), "2\n2\n");
    }

    #[test]
    fn test_block_scoping_and_shadowing() {
        assert_eq!(
            run_ok("var a = \"outer\"; { var a = \"inner\"; print a; } print a;"),
            "inner\nouter\n"
        );
    }

    #[test]
    fn test_environment_restored_after_runtime_error_in_block() {
        // The block fails midway; the enclosing scope must still be intact
        // for the following statement.
        let source = "var a = 1; { var a = 2; a + nil; }";
        let err = run_err(source);
        assert!(err.contains("Operands must be"), "got: {}", err);
    }

    #[test]
    fn test_undefined_variable_is_runtime_error() {
        let err = run_err("print missing;");
        assert!(err.contains("Undefined variable 'missing'."));
    }

    #[test]
    fn test_assign_to_undefined_is_runtime_error() {
        let err = run_err("missing = 1;");
        assert!(err.contains("Undefined variable 'missing'."));
    }

    #[test]
    fn test_while_loop() {
        assert_eq!(
            run_ok("var i = 0; while (i < 3) { print i; i = i + 1; }"),
            "0\n1\n2\n"
        );
    }

    #[test]
    fn test_for_loop() {
        assert_eq!(
            run_ok("for (var i = 0; i < 3; i = i + 1) print i;"),
            "0\n1\n2\n"
        );
    }

    // ── functions & closures ────────────────────────────────────────────

    #[test]
    fn test_fibonacci() {
        assert_eq!(
            run_ok("fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); } print fib(10);"),
            "55\n"
        );
    }

    #[test]
    fn test_counter_closure() {
        assert_eq!(
            run_ok(
                "fun mk() { var i = 0; fun c() { i = i + 1; return i; } return c; } \
                 var c = mk(); print c(); print c();"
            ),
            "1\n2\n"
        );
    }

    #[test]
    fn test_closures_are_independent() {
        assert_eq!(
            run_ok(
                "fun mk() { var i = 0; fun c() { i = i + 1; return i; } return c; } \
                 var a = mk(); var b = mk(); print a(); print a(); print b();"
            ),
            "1\n2\n1\n"
        );
    }

    #[test]
    fn test_closure_captures_declaration_environment() {
        // The classic jlox scope-capture program: the closure must keep
        // seeing the binding that was in scope where it was declared.
        assert_eq!(
            run_ok(
                "var a = \"global\"; \
                 { fun show() { print a; } show(); var a = \"block\"; show(); }"
            ),
            "global\nglobal\n"
        );
    }

    #[test]
    fn test_function_without_return_yields_nil() {
        assert_eq!(run_ok("fun f() { } print f();"), "nil\n");
    }

    #[test]
    fn test_return_unwinds_nested_statements() {
        assert_eq!(
            run_ok("fun f() { while (true) { if (true) return \"done\"; } } print f();"),
            "done\n"
        );
    }

    #[test]
    fn test_function_stringification() {
        assert_eq!(run_ok("fun f() { } print f;"), "<fn f>\n");
        assert_eq!(run_ok("print clock;"), "<native fn>\n");
    }

    #[test]
    fn test_clock_returns_number() {
        assert_eq!(run_ok("print clock() >= 0;"), "true\n");
    }

    #[test]
    fn test_call_non_callable_is_runtime_error() {
        let err = run_err("\"not a fn\"();");
        assert!(err.contains("Can only call functions and classes."));
    }

    #[test]
    fn test_arity_mismatch_is_runtime_error() {
        let err = run_err("fun f(a, b) { } f(1);");
        assert!(err.contains("Expected 2 arguments but got 1."));
    }

    #[test]
    fn test_recursion_through_global_name() {
        assert_eq!(
            run_ok("fun countdown(n) { if (n > 0) { print n; countdown(n - 1); } } countdown(2);"),
            "2\n1\n"
        );
    }

    // ── operand type errors ─────────────────────────────────────────────

    #[test]
    fn test_numeric_operator_type_error() {
        let err = run_err("print 1 < \"2\";");
        assert!(err.contains("Operands must be numbers."));
    }

    #[test]
    fn test_plus_type_error_message() {
        let err = run_err("print 1 + \"2\";");
        assert!(err.contains("Operands must be two numbers or two strings."));
    }

    #[test]
    fn test_unary_minus_type_error() {
        let err = run_err("print -\"oops\";");
        assert!(err.contains("Operand must be a number."));
    }

    #[test]
    fn test_runtime_error_carries_line() {
        let err = run_err("var a = 1;\nprint a + nil;");
        assert!(err.contains("[line 2]"), "got: {}", err);
    }

    // ── classes ─────────────────────────────────────────────────────────

    #[test]
    fn test_class_method_call() {
        assert_eq!(
            run_ok("class Bacon { eat() { print \"Crunch\"; } } Bacon().eat();"),
            "Crunch\n"
        );
    }

    #[test]
    fn test_class_and_instance_stringification() {
        assert_eq!(
            run_ok("class Bagel { } print Bagel; print Bagel();"),
            "Bagel\nBagel instance\n"
        );
    }

    #[test]
    fn test_fields_created_on_first_write() {
        assert_eq!(
            run_ok("class Box { } var b = Box(); b.value = 42; print b.value;"),
            "42\n"
        );
    }

    #[test]
    fn test_set_is_an_expression() {
        assert_eq!(
            run_ok("class Box { } var b = Box(); print b.value = 7;"),
            "7\n"
        );
    }

    #[test]
    fn test_fields_shadow_methods() {
        assert_eq!(
            run_ok(
                "class C { m() { return \"method\"; } } \
                 var c = C(); c.m = 1; print c.m;"
            ),
            "1\n"
        );
    }

    #[test]
    fn test_undefined_property_is_runtime_error() {
        let err = run_err("class C { } print C().missing;");
        assert!(err.contains("Undefined property 'missing'."));
    }

    #[test]
    fn test_property_on_non_instance_is_runtime_error() {
        let err = run_err("print (1).field;");
        assert!(err.contains("Only instances have properties."));

        let err = run_err("1.field = 2;");
        assert!(err.contains("Only instances have fields."));
    }

    #[test]
    fn test_this_in_method() {
        assert_eq!(
            run_ok(
                "class Cake { flavor() { return this.kind; } } \
                 var cake = Cake(); cake.kind = \"chocolate\"; print cake.flavor();"
            ),
            "chocolate\n"
        );
    }

    #[test]
    fn test_bound_method_remembers_receiver() {
        assert_eq!(
            run_ok(
                "class Person { greet() { print this.name; } } \
                 var a = Person(); a.name = \"Ada\"; \
                 var f = a.greet; f();"
            ),
            "Ada\n"
        );
    }

    #[test]
    fn test_initializer_runs_on_construction() {
        assert_eq!(
            run_ok(
                "class Point { init(x, y) { this.x = x; this.y = y; } } \
                 var p = Point(3, 4); print p.x; print p.y;"
            ),
            "3\n4\n"
        );
    }

    #[test]
    fn test_class_arity_comes_from_init() {
        let err = run_err("class Point { init(x, y) { } } Point(1);");
        assert!(err.contains("Expected 2 arguments but got 1."));
    }

    #[test]
    fn test_initializer_returns_this_when_called_directly() {
        assert_eq!(
            run_ok(
                "class Thing { init() { this.tag = \"t\"; } } \
                 var t = Thing(); print t.init().tag;"
            ),
            "t\n"
        );
    }

    #[test]
    fn test_early_return_in_initializer_still_yields_instance() {
        assert_eq!(
            run_ok(
                "class Guard { init(ok) { if (!ok) return; this.ready = true; } } \
                 print Guard(false);"
            ),
            "Guard instance\n"
        );
    }

    #[test]
    fn test_instance_field_cycle_is_tolerated() {
        assert_eq!(
            run_ok("class Node { } var n = Node(); n.me = n; print n.me;"),
            "Node instance\n"
        );
    }

    // ── inheritance ─────────────────────────────────────────────────────

    #[test]
    fn test_inherited_method() {
        assert_eq!(
            run_ok(
                "class A { m() { print \"A\"; } } \
                 class B < A { } B().m();"
            ),
            "A\n"
        );
    }

    #[test]
    fn test_super_calls_parent_method() {
        assert_eq!(
            run_ok(
                "class A { m() { print \"A\"; } } \
                 class B < A { m() { super.m(); print \"B\"; } } \
                 B().m();"
            ),
            "A\nB\n"
        );
    }

    #[test]
    fn test_super_skips_own_override() {
        // super binds to the declaring class's parent, not the receiver's.
        assert_eq!(
            run_ok(
                "class A { m() { print \"A\"; } } \
                 class B < A { m() { super.m(); } } \
                 class C < B { } \
                 C().m();"
            ),
            "A\n"
        );
    }

    #[test]
    fn test_inherited_initializer() {
        assert_eq!(
            run_ok(
                "class A { init() { this.x = 1; } } \
                 class B < A { } print B().x;"
            ),
            "1\n"
        );
    }

    #[test]
    fn test_superclass_must_be_class() {
        let err = run_err("var NotAClass = 1; class C < NotAClass { }");
        assert!(err.contains("Superclass must be a class."));
    }

    #[test]
    fn test_undefined_super_method_is_runtime_error() {
        let err = run_err(
            "class A { } class B < A { m() { super.missing(); } } B().m();",
        );
        assert!(err.contains("Undefined property 'missing'."));
    }

    // ── session reuse (REPL shape) ──────────────────────────────────────

    /// Feed one line to an existing interpreter, threading the expression-id
    /// counter the way the REPL driver does.
    fn run_line(
        interpreter: &mut Interpreter,
        source: &str,
        next_id: usize,
    ) -> (Result<(), LoxError>, usize) {
        let tokens: Vec<Token> = Scanner::new(source.as_bytes())
            .filter_map(Result::ok)
            .collect();

        let mut parser = Parser::new(tokens, next_id);
        let (statements, parse_errors) = parser.parse();
        assert!(parse_errors.is_empty(), "parse errors: {:?}", parse_errors);

        let (locals, resolve_errors) = Resolver::new().resolve(&statements);
        assert!(
            resolve_errors.is_empty(),
            "resolve errors: {:?}",
            resolve_errors
        );

        interpreter.add_locals(locals);

        (interpreter.interpret(&statements), parser.next_expr_id())
    }

    #[test]
    fn test_environment_survives_runtime_error_between_lines() {
        let output = Rc::new(RefCell::new(Vec::new()));
        let mut interpreter = Interpreter::with_output(output.clone());

        let (result, next_id) = run_line(&mut interpreter, "var a = 1;", 0);
        assert!(result.is_ok());

        // Fails inside a block; the global frame must be current again.
        let (result, next_id) = run_line(&mut interpreter, "{ var a = 2; a + nil; }", next_id);
        assert!(result.is_err());

        let (result, _) = run_line(&mut interpreter, "print a;", next_id);
        assert!(result.is_ok());

        let printed = String::from_utf8(output.borrow().clone()).unwrap();
        assert_eq!(printed, "1\n");
    }

    #[test]
    fn test_closure_from_earlier_line_keeps_its_bindings() {
        let output = Rc::new(RefCell::new(Vec::new()));
        let mut interpreter = Interpreter::with_output(output.clone());

        let (result, next_id) = run_line(
            &mut interpreter,
            "fun mk() { var i = 0; fun c() { i = i + 1; return i; } return c; } var c = mk();",
            0,
        );
        assert!(result.is_ok());

        let (result, _) = run_line(&mut interpreter, "print c(); print c();", next_id);
        assert!(result.is_ok());

        let printed = String::from_utf8(output.borrow().clone()).unwrap();
        assert_eq!(printed, "1\n2\n");
    }
}
